/// Matrix builders and the 2D affine transform used for rasterization
use nalgebra::{Matrix4, Point2, Vector2, Vector3};

/// Smallest |sin| allowed between the images of the two model axes
const MIN_AXIS_SINE: f32 = 1e-4;

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    pub fn uniform_scale_matrix(s: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(s)
    }

    /// Scale about the origin, then translate
    pub fn scale_then_translate(scale: f32, translation: Vector3<f32>) -> Matrix4<f32> {
        Self::translation_matrix(translation.x, translation.y, translation.z)
            * Self::uniform_scale_matrix(scale)
    }

    /// Chain transforms in application order: `first`, then `second`, then `third`
    pub fn chain(
        first: &Matrix4<f32>,
        second: &Matrix4<f32>,
        third: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        third * second * first
    }
}

/// The planar part of a 4x4 transform, with depth dropped.
///
/// Coefficients follow row-vector naming: a point maps as
/// `x' = x*m11 + y*m21 + m41`, `y' = x*m12 + y*m22 + m42`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub m41: f32,
    pub m42: f32,
}

impl Affine2 {
    pub fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            m41: 0.0,
            m42: 0.0,
        }
    }

    /// Take the x/y rows of a column-vector matrix, ignoring z input and output
    pub fn from_matrix(m: &Matrix4<f32>) -> Self {
        Self {
            m11: m[(0, 0)],
            m12: m[(1, 0)],
            m21: m[(0, 1)],
            m22: m[(1, 1)],
            m41: m[(0, 3)],
            m42: m[(1, 3)],
        }
    }

    pub fn determinant(&self) -> f32 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// Whether the map squashes the plane onto a line or a point.
    ///
    /// Independent of scale: the determinant is compared against the
    /// lengths of the two mapped axes, so models in large units pass.
    pub fn is_collapsed(&self) -> bool {
        let x_axis = Vector2::new(self.m11, self.m12).norm();
        let y_axis = Vector2::new(self.m21, self.m22).norm();
        if !(x_axis > 0.0 && y_axis > 0.0) {
            return true;
        }
        if x_axis.min(y_axis) / x_axis.max(y_axis) < f32::EPSILON {
            return true;
        }
        self.determinant().abs() / (x_axis * y_axis) < MIN_AXIS_SINE
    }

    pub fn is_finite(&self) -> bool {
        [self.m11, self.m12, self.m21, self.m22, self.m41, self.m42]
            .iter()
            .all(|c| c.is_finite())
    }

    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(
            p.x * self.m11 + p.y * self.m21 + self.m41,
            p.x * self.m12 + p.y * self.m22 + self.m42,
        )
    }
}
