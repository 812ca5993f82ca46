/// Wavefront OBJ/MTL import through `tobj`
use std::path::Path;

use nalgebra::Point3;
use tracing::warn;

use crate::error::{RenderError, Result};
use crate::geometry::{Color4, Face, Material, Mesh, Scene};

/// Diffuse used when a material omits `Kd`
const DEFAULT_DIFFUSE: [f32; 3] = [0.6, 0.6, 0.6];

pub fn load_obj(path: &Path) -> Result<Scene> {
    // Keep polygons as authored; the rasterizer decides what to draw
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    let (models, materials) = tobj::load_obj(path, &options)
        .map_err(|e| RenderError::Import(format!("{}: {e}", path.display())))?;

    let materials = materials.unwrap_or_else(|e| {
        warn!(path = %path.display(), "material library not loaded: {e}");
        Vec::new()
    });

    Ok(scene_from_models(models, materials))
}

fn scene_from_models(models: Vec<tobj::Model>, materials: Vec<tobj::Material>) -> Scene {
    let mut vertices = Vec::new();
    let mut meshes = Vec::with_capacity(models.len());

    for model in models {
        // Models carry their own vertex arrays; offset into the shared one
        let base = vertices.len();
        let source = model.mesh;
        vertices.extend(
            source
                .positions
                .chunks_exact(3)
                .map(|p| Point3::new(p[0], p[1], p[2])),
        );

        let material_index = source.material_id.unwrap_or(0);
        let to_face = |indices: &[u32]| {
            Face::new(
                material_index,
                indices.iter().map(|&i| base + i as usize).collect(),
            )
        };

        let mut mesh = Mesh::new(model.name);
        if source.face_arities.is_empty() {
            for triangle in source.indices.chunks(3) {
                mesh.add_face(to_face(triangle));
            }
        } else {
            let mut start = 0;
            for &arity in &source.face_arities {
                let end = start + arity as usize;
                let Some(polygon) = source.indices.get(start..end) else {
                    break;
                };
                mesh.add_face(to_face(polygon));
                start = end;
            }
        }
        meshes.push(mesh);
    }

    let mut materials: Vec<Material> = materials.into_iter().map(convert_material).collect();
    if materials.is_empty() {
        materials.push(Material::fallback());
    }

    Scene::new(vertices, meshes, materials)
}

fn convert_material(material: tobj::Material) -> Material {
    let [r, g, b] = material.diffuse.unwrap_or(DEFAULT_DIFFUSE);
    let a = material.dissolve.unwrap_or(1.0);
    Material::new(material.name, Color4::new(a, r, g, b))
}
