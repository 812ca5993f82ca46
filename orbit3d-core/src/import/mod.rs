/// Mesh import adapters producing plain in-memory scenes
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{RenderError, Result};
use crate::geometry::Scene;

pub mod coords;
pub mod dae;
pub mod obj;
pub mod stl;

pub use coords::parse_coordinate_groups;
pub use dae::parse_dae;
pub use obj::load_obj;
pub use stl::parse_stl;

/// Load a scene, choosing the reader from the file extension
pub fn load(path: &Path) -> Result<Scene> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let scene = match extension.as_deref() {
        Some("dae") => parse_dae(&String::from_utf8_lossy(&read(path)?))?,
        Some("obj") => load_obj(path)?,
        Some("stl") => parse_stl(&read(path)?)?,
        Some("txt") | Some("xyz") => {
            let text = String::from_utf8_lossy(&read(path)?).into_owned();
            Scene::new(parse_coordinate_groups(&text), Vec::new(), Vec::new())
        }
        _ => {
            return Err(RenderError::Import(format!(
                "unsupported mesh format: {}",
                path.display()
            )))
        }
    };

    info!(
        path = %path.display(),
        vertices = scene.vertices.len(),
        faces = scene.face_count(),
        materials = scene.materials.len(),
        "imported scene"
    );
    Ok(scene)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| RenderError::Import(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let points = dir.path().join("points.XYZ");
        fs::write(&points, "1 2 3\nbad line\n4 5 6\n").unwrap();
        let scene = load(&points).unwrap();
        assert_eq!(scene.vertices.len(), 2);
        assert_eq!(scene.face_count(), 0);

        let stl = dir.path().join("part.stl");
        fs::write(&stl, "solid\nendsolid\n").unwrap();
        assert_eq!(load(&stl).unwrap().face_count(), 0);
    }

    #[test]
    fn test_load_collada_points() {
        let dir = tempfile::tempdir().unwrap();
        let dae = dir.path().join("car.dae");
        fs::write(
            &dae,
            "<COLLADA><float_array>-1 -1 0\n1 1 2\n0.5</float_array></COLLADA>",
        )
        .unwrap();

        let bounds = load(&dae).unwrap().bounding_box().unwrap();
        assert_eq!(bounds.min, nalgebra::Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(bounds.max, nalgebra::Point3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_unsupported_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let ply = dir.path().join("car.ply");
        fs::write(&ply, "ply\nformat ascii 1.0\n").unwrap();
        assert!(matches!(load(&ply), Err(RenderError::Import(_))));

        let missing = dir.path().join("missing.stl");
        assert!(matches!(load(&missing), Err(RenderError::Import(_))));
    }
}
