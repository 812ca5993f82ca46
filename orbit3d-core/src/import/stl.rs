/// STL reader for binary and ASCII formats
use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::{float, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{RenderError, Result};
use crate::geometry::{Face, Material, Mesh, Scene, Vertex3};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

type Facet = [Vertex3; 3];

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Scene> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(scene) = parse_ascii_stl(text) {
                return Ok(scene);
            }
        }
    }

    parse_binary_stl(data)
}

pub fn parse_binary_stl(data: &[u8]) -> Result<Scene> {
    let (body, count) = binary_header(data).map_err(|_| {
        RenderError::Import("file too small to be a valid STL".to_string())
    })?;

    let count = count as usize;
    if body.len() < count.saturating_mul(FACET_LEN) {
        return Err(RenderError::Import(format!(
            "unexpected end of file: {count} facets declared, {} bytes present",
            body.len()
        )));
    }

    let mut facets = Vec::with_capacity(count);
    let mut input = body;
    for _ in 0..count {
        let (rest, facet) = binary_facet(input)
            .map_err(|e| {
                RenderError::Import(format!("malformed binary STL facet: {:?}", e.map(|e| e.code)))
            })?;
        facets.push(facet);
        input = rest;
    }

    Ok(scene_from_facets(facets))
}

pub fn parse_ascii_stl(input: &str) -> Result<Scene> {
    match ascii_solid(input) {
        Ok((_, facets)) => Ok(scene_from_facets(facets)),
        Err(e) => Err(RenderError::Import(format!(
            "failed to parse ASCII STL: {:?}",
            e.map(|e| e.code)
        ))),
    }
}

fn scene_from_facets(facets: Vec<Facet>) -> Scene {
    let mut vertices = Vec::with_capacity(facets.len() * 3);
    let mut mesh = Mesh::new("stl");

    for facet in facets {
        let base = vertices.len();
        vertices.extend_from_slice(&facet);
        mesh.add_face(Face::triangle(0, base, base + 1, base + 2));
    }

    Scene::new(vertices, vec![mesh], vec![Material::fallback()])
}

fn binary_header(input: &[u8]) -> IResult<&[u8], u32> {
    let (input, _header) = take(HEADER_LEN)(input)?;
    le_u32(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Facet> {
    // Stored normals are ignored; shading is flat per material
    let (input, _normal) = take(12usize)(input)?;
    let (input, a) = binary_vertex(input)?;
    let (input, b) = binary_vertex(input)?;
    let (input, c) = binary_vertex(input)?;
    let (input, _attributes) = take(2usize)(input)?;
    Ok((input, [a, b, c]))
}

fn binary_vertex(input: &[u8]) -> IResult<&[u8], Vertex3> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, facets) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

fn ascii_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = ascii_vertex(input)?;
    let (input, b) = ascii_vertex(input)?;
    let (input, c) = ascii_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;
    Ok((input, [a, b, c]))
}

fn ascii_vertex(input: &str) -> IResult<&str, Vertex3> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = vector3(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}
