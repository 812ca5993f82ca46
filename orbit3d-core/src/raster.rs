/// Flat-fill triangle rasterizer with painter's-order compositing
use std::collections::BTreeMap;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::{argb_to_rgba, rgba_to_image_color};
use crate::geometry::{Face, Scene};
use crate::transform::Affine2;

/// Fixed-size RGBA pixel grid owned by one render pass
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 4]>,
}

impl Framebuffer {
    /// Allocate a transparent black buffer
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Write a pixel; coordinates outside the grid are ignored
    pub fn set(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = rgba;
    }

    /// Row-major RGBA bytes
    pub fn as_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    pub fn painted_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| **p != [0; 4]).count()
    }
}

/// One `source -> target` material redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialAlias {
    pub source: usize,
    pub target: usize,
}

/// Material redirects applied at draw time, independent of the mesh's own assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialAliases {
    table: BTreeMap<usize, usize>,
}

impl MaterialAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, index: usize) -> usize {
        self.table.get(&index).copied().unwrap_or(index)
    }
}

impl FromIterator<MaterialAlias> for MaterialAliases {
    fn from_iter<I: IntoIterator<Item = MaterialAlias>>(iter: I) -> Self {
        Self {
            table: iter
                .into_iter()
                .map(|alias| (alias.source, alias.target))
                .collect(),
        }
    }
}

/// Per-pass face accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub drawn: usize,
    pub skipped_arity: usize,
    pub skipped_vertex: usize,
    pub skipped_material: usize,
}

pub struct Rasterizer<'a> {
    transform: Affine2,
    geometry_scale: f32,
    aliases: &'a MaterialAliases,
}

impl<'a> Rasterizer<'a> {
    pub fn new(transform: Affine2, geometry_scale: f32, aliases: &'a MaterialAliases) -> Self {
        Self {
            transform,
            geometry_scale,
            aliases,
        }
    }

    /// Draw every mesh in traversal order; later faces overwrite earlier ones.
    pub fn render_scene(&self, scene: &Scene, framebuffer: &mut Framebuffer) -> RasterStats {
        let mut stats = RasterStats::default();

        for mesh in &scene.meshes {
            for face in &mesh.faces {
                self.render_face(scene, face, framebuffer, &mut stats);
            }
        }

        if stats.skipped_vertex > 0 || stats.skipped_material > 0 {
            warn!(
                skipped_vertex = stats.skipped_vertex,
                skipped_material = stats.skipped_material,
                "faces with unresolved indices were skipped"
            );
        }
        debug!(
            drawn = stats.drawn,
            skipped_arity = stats.skipped_arity,
            "rasterized scene"
        );
        stats
    }

    fn render_face(
        &self,
        scene: &Scene,
        face: &Face,
        framebuffer: &mut Framebuffer,
        stats: &mut RasterStats,
    ) {
        let Some(indices) = face.as_triangle() else {
            stats.skipped_arity += 1;
            return;
        };

        let material_index = self.aliases.resolve(face.material_index);
        let Some(material) = scene.materials.get(material_index) else {
            stats.skipped_material += 1;
            return;
        };

        let mut screen = [Point2::origin(); 3];
        for (slot, &index) in screen.iter_mut().zip(indices.iter()) {
            let Some(vertex) = scene.vertices.get(index) else {
                stats.skipped_vertex += 1;
                return;
            };
            *slot = self.project(vertex.x, vertex.y);
        }

        let fill = argb_to_rgba(rgba_to_image_color(&material.diffuse));
        fill_triangle(framebuffer, &screen, fill);
        stats.drawn += 1;
    }

    /// Scale model x/y, then apply the camera's planar transform
    pub fn project(&self, x: f32, y: f32) -> Point2<f32> {
        self.transform
            .apply(Point2::new(x * self.geometry_scale, y * self.geometry_scale))
    }
}

/// Solid-fill a screen-space triangle; zero-area triangles paint nothing
pub fn fill_triangle(framebuffer: &mut Framebuffer, v: &[Point2<f32>; 3], rgba: [u8; 4]) {
    let (v0, v1, v2) = (v[0], v[1], v[2]);
    if !v.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        return;
    }

    // Bounding box
    let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
    let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
    let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
    let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

    // Clip to screen bounds
    let min_x = min_x.max(0);
    let max_x = max_x.min(clip_extent(framebuffer.width()));
    let min_y = min_y.max(0);
    let max_y = max_y.min(clip_extent(framebuffer.height()));

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);

            if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    framebuffer.set(x, y, rgba);
                }
            }
        }
    }
}

/// Last addressable pixel index along one side
fn clip_extent(size: usize) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX).saturating_sub(1)
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    p: Point2<f32>,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color4, Material, Mesh};
    use nalgebra::Point3;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn scene_with(faces: Vec<Face>, materials: Vec<Material>) -> Scene {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(5.0, 5.0, 0.0),
        ];
        let mut mesh = Mesh::new("test");
        for face in faces {
            mesh.add_face(face);
        }
        Scene::new(vertices, vec![mesh], materials)
    }

    fn materials() -> Vec<Material> {
        vec![
            Material::new("blue", Color4::opaque(0.0, 0.0, 1.0)),
            Material::new("green", Color4::opaque(0.0, 1.0, 0.0)),
            Material::new("black", Color4::opaque(0.0, 0.0, 0.0)),
            Material::new("white", Color4::opaque(1.0, 1.0, 1.0)),
        ]
    }

    #[test]
    fn test_fill_covers_interior() {
        let mut fb = Framebuffer::new(16, 16);
        let tri = [
            Point2::new(0.0, 0.0),
            Point2::new(12.0, 0.0),
            Point2::new(0.0, 12.0),
        ];
        fill_triangle(&mut fb, &tri, RED);
        assert_eq!(fb.get(1, 1), Some(RED));
        assert_eq!(fb.get(10, 10), Some([0; 4]));
        assert!(fb.painted_pixels() > 50);
    }

    #[test]
    fn test_fill_ignores_winding() {
        let mut cw = Framebuffer::new(16, 16);
        let mut ccw = Framebuffer::new(16, 16);
        let a = Point2::new(1.0, 1.0);
        let b = Point2::new(14.0, 2.0);
        let c = Point2::new(3.0, 13.0);
        fill_triangle(&mut cw, &[a, b, c], RED);
        fill_triangle(&mut ccw, &[a, c, b], RED);
        assert_eq!(cw, ccw);
    }

    #[test]
    fn test_collinear_triangle_paints_nothing() {
        let mut fb = Framebuffer::new(16, 16);
        let line = [
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 5.0),
            Point2::new(10.0, 10.0),
        ];
        fill_triangle(&mut fb, &line, RED);
        assert_eq!(fb.painted_pixels(), 0);
    }

    #[test]
    fn test_fill_clips_to_raster() {
        let mut fb = Framebuffer::new(8, 8);
        let tri = [
            Point2::new(-100.0, -100.0),
            Point2::new(100.0, -100.0),
            Point2::new(0.0, 100.0),
        ];
        fill_triangle(&mut fb, &tri, RED);
        assert_eq!(fb.painted_pixels(), 64);
    }

    #[test]
    fn test_clip_extent_saturates() {
        assert_eq!(clip_extent(0), -1);
        assert_eq!(clip_extent(800), 799);
        assert_eq!(clip_extent(usize::MAX), i32::MAX - 1);
    }

    #[test]
    fn test_last_drawn_face_wins() {
        let scene = scene_with(
            vec![Face::triangle(0, 0, 1, 2), Face::triangle(1, 0, 1, 2)],
            materials(),
        );
        let aliases = MaterialAliases::new();
        let mut fb = Framebuffer::new(16, 16);
        let stats =
            Rasterizer::new(Affine2::identity(), 1.0, &aliases).render_scene(&scene, &mut fb);

        assert_eq!(stats.drawn, 2);
        assert_eq!(fb.get(2, 2), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_material_alias_redirects_fill() {
        let scene = scene_with(vec![Face::triangle(3, 0, 1, 2)], materials());
        let aliases: MaterialAliases = [MaterialAlias {
            source: 3,
            target: 0,
        }]
        .into_iter()
        .collect();
        let mut fb = Framebuffer::new(16, 16);
        Rasterizer::new(Affine2::identity(), 1.0, &aliases).render_scene(&scene, &mut fb);

        assert_eq!(fb.get(2, 2), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_non_triangles_and_bad_indices_are_skipped() {
        let scene = scene_with(
            vec![
                Face::new(0, vec![0, 1, 3, 2]),
                Face::new(0, vec![0, 1]),
                Face::triangle(0, 0, 1, 99),
                Face::triangle(42, 0, 1, 2),
            ],
            materials(),
        );
        let aliases = MaterialAliases::new();
        let mut fb = Framebuffer::new(16, 16);
        let stats =
            Rasterizer::new(Affine2::identity(), 1.0, &aliases).render_scene(&scene, &mut fb);

        assert_eq!(
            stats,
            RasterStats {
                drawn: 0,
                skipped_arity: 2,
                skipped_vertex: 1,
                skipped_material: 1,
            }
        );
        assert_eq!(fb.painted_pixels(), 0);
    }

    #[test]
    fn test_geometry_scale_and_transform() {
        let scene = scene_with(vec![Face::triangle(1, 0, 1, 2)], materials());
        let aliases = MaterialAliases::new();
        let shift = Affine2 {
            m41: 20.0,
            m42: 20.0,
            ..Affine2::identity()
        };
        let rasterizer = Rasterizer::new(shift, 2.0, &aliases);
        assert_eq!(rasterizer.project(10.0, 0.0), Point2::new(40.0, 20.0));

        let mut fb = Framebuffer::new(64, 64);
        rasterizer.render_scene(&scene, &mut fb);
        assert_eq!(fb.get(10, 10), Some([0; 4]));
        assert_eq!(fb.get(22, 22), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_degenerate_face_in_scene_is_not_an_error() {
        // Vertices 0, 4, 3 lie on the diagonal
        let scene = scene_with(vec![Face::triangle(0, 0, 4, 3)], materials());
        let aliases = MaterialAliases::new();
        let mut fb = Framebuffer::new(16, 16);
        let stats =
            Rasterizer::new(Affine2::identity(), 1.0, &aliases).render_scene(&scene, &mut fb);
        assert_eq!(stats.drawn, 1);
        assert_eq!(fb.painted_pixels(), 0);
    }
}
