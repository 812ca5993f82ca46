/// Geometry primitives consumed by the orbit and render stages
use nalgebra::{Point3, Vector3};

use crate::error::{RenderError, Result};

/// A model-space vertex position
pub type Vertex3 = Point3<f32>;

/// Per-axis extrema of a vertex set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Reduce a vertex stream to its extrema.
    ///
    /// The fold is seeded with the first vertex, so ranges that never
    /// cross zero keep their true bounds.
    pub fn from_vertices<'a, I>(vertices: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Vertex3>,
    {
        let mut iter = vertices.into_iter();
        let first = iter.next().ok_or(RenderError::EmptyGeometry)?;

        Ok(iter.fold(Self::new(*first, *first), |bounds, v| Self {
            min: bounds.min.inf(v),
            max: bounds.max.sup(v),
        }))
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Size along each axis
    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Diagonal of the box projected onto the XY plane
    pub fn planar_diagonal(&self) -> f32 {
        let extent = self.extent();
        (extent.x * extent.x + extent.y * extent.y).sqrt()
    }
}

/// Normalized diffuse color, each channel in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color4 {
    pub a: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color4 {
    pub fn new(a: f32, r: f32, g: f32, b: f32) -> Self {
        Self { a, r, g, b }
    }

    pub fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self::new(1.0, r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Color4,
}

impl Material {
    pub fn new(name: impl Into<String>, diffuse: Color4) -> Self {
        Self {
            name: name.into(),
            diffuse,
        }
    }

    /// Flat grey used when an import carries no material of its own
    pub fn fallback() -> Self {
        Self::new("default", Color4::opaque(0.6, 0.6, 0.6))
    }
}

/// A polygon referencing the scene's vertex array.
///
/// Only faces with exactly three indices are rasterized.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub material_index: usize,
    pub indices: Vec<usize>,
}

impl Face {
    pub fn new(material_index: usize, indices: Vec<usize>) -> Self {
        Self {
            material_index,
            indices,
        }
    }

    pub fn triangle(material_index: usize, a: usize, b: usize, c: usize) -> Self {
        Self::new(material_index, vec![a, b, c])
    }

    pub fn as_triangle(&self) -> Option<[usize; 3]> {
        match self.indices.as_slice() {
            &[a, b, c] => Some([a, b, c]),
            _ => None,
        }
    }
}

/// An ordered run of faces; traversal order is draw order
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            faces: Vec::new(),
        }
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }
}

/// Everything an import produces: shared vertices, meshes and materials
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub vertices: Vec<Vertex3>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Scene {
    pub fn new(vertices: Vec<Vertex3>, meshes: Vec<Mesh>, materials: Vec<Material>) -> Self {
        Self {
            vertices,
            meshes,
            materials,
        }
    }

    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_vertices(&self.vertices)
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.faces.len()).sum()
    }

    /// Create an indexed cube with one material per side
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Point3::new(-half, -half, -half),
            Point3::new(half, -half, -half),
            Point3::new(half, half, -half),
            Point3::new(-half, half, -half),
            Point3::new(-half, -half, half),
            Point3::new(half, -half, half),
            Point3::new(half, half, half),
            Point3::new(-half, half, half),
        ];

        let materials = vec![
            Material::new("front", Color4::opaque(0.9, 0.2, 0.2)),
            Material::new("back", Color4::opaque(0.2, 0.9, 0.2)),
            Material::new("top", Color4::opaque(0.2, 0.2, 0.9)),
            Material::new("bottom", Color4::opaque(0.9, 0.9, 0.2)),
            Material::new("right", Color4::opaque(0.9, 0.2, 0.9)),
            Material::new("left", Color4::opaque(0.2, 0.9, 0.9)),
        ];

        // (material, quad) per side, split into two triangles each
        let sides: [(usize, [usize; 4]); 6] = [
            (0, [4, 5, 6, 7]),
            (1, [0, 3, 2, 1]),
            (2, [3, 7, 6, 2]),
            (3, [0, 1, 5, 4]),
            (4, [1, 2, 6, 5]),
            (5, [0, 4, 7, 3]),
        ];

        let mut mesh = Mesh::new("cube");
        for (material, [a, b, c, d]) in sides {
            mesh.add_face(Face::triangle(material, a, b, c));
            mesh.add_face(Face::triangle(material, a, c, d));
        }

        Self::new(vertices, vec![mesh], materials)
    }
}
