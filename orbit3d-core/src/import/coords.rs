/// Raw coordinate-group lists: one `x y z` triple per line
use nalgebra::Point3;
use nom::{
    character::complete::{space0, space1},
    combinator::{all_consuming, map_opt},
    multi::separated_list1,
    number::complete::float,
    sequence::delimited,
    IResult,
};
use tracing::debug;

use crate::geometry::Vertex3;

/// Collect every line holding exactly three finite numbers.
///
/// Any other line (too few or too many values, stray text, NaN) is
/// skipped rather than treated as an error.
pub fn parse_coordinate_groups(text: &str) -> Vec<Vertex3> {
    let mut skipped = 0usize;
    let vertices: Vec<Vertex3> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match coordinate_group(line) {
            Ok((_, vertex)) => Some(vertex),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        debug!(skipped, kept = vertices.len(), "skipped malformed coordinate groups");
    }
    vertices
}

fn coordinate_group(line: &str) -> IResult<&str, Vertex3> {
    all_consuming(map_opt(
        delimited(space0, separated_list1(space1, float), space0),
        |values: Vec<f32>| match values.as_slice() {
            &[x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => {
                Some(Point3::new(x, y, z))
            }
            _ => None,
        },
    ))(line)
}
