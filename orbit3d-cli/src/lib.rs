/// Command-line front end for the orbit renderer
use orbit3d_core::{BoundingBox, OrbitPath};
use std::io::{self, Write};

pub mod preview;

pub use preview::TerminalPreview;

/// Print the box center and every orbit sample, one per line
pub fn write_orbit_table<W: Write>(
    writer: &mut W,
    bounds: &BoundingBox,
    path: &OrbitPath,
) -> io::Result<()> {
    let center = bounds.center();
    writeln!(
        writer,
        "Center: X: {:10.2} Y: {:10.2} Z: {:10.2}",
        center.x, center.y, center.z
    )?;
    for sample in &path.samples {
        let p = sample.position;
        writeln!(
            writer,
            "Angle: {:10} X: {:10.2} Y: {:10.2} Z: {:10.2}",
            sample.angle_degrees, p.x, p.y, p.z
        )?;
    }
    Ok(())
}
