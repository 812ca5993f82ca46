/// Orthographic camera matrices for a chosen orbit sample
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::geometry::BoundingBox;
use crate::orbit::OrbitSample;
use crate::transform::{Affine2, Transform};

const MIN_EXTENT: f32 = 1e-6;

/// Which two bounding-box axes span the horizontal and vertical viewport.
///
/// This is a fixed convention picked by the caller; it is not derived
/// from the camera direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportAxes {
    /// Left/right from X, bottom/top from Z
    #[default]
    Xz,
    Xy,
    Yz,
}

impl ViewportAxes {
    /// `(left, right, bottom, top)` taken from the box
    pub fn bounds(&self, bbox: &BoundingBox) -> (f32, f32, f32, f32) {
        let (h, v) = match self {
            ViewportAxes::Xz => (0, 2),
            ViewportAxes::Xy => (0, 1),
            ViewportAxes::Yz => (1, 2),
        };
        (bbox.min[h], bbox.max[h], bbox.min[v], bbox.max[v])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub viewport_axes: ViewportAxes,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            viewport_axes: ViewportAxes::default(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Scale and offset that place projected geometry inside the raster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenMap {
    pub scale: f32,
    /// Vertical translation as a fraction of the raster height
    pub vertical_offset: f32,
    pub depth_offset: f32,
}

impl Default for ScreenMap {
    fn default() -> Self {
        Self {
            scale: 2.0,
            vertical_offset: 0.75,
            depth_offset: 1.0,
        }
    }
}

impl ScreenMap {
    pub fn matrix(&self, width: u32, height: u32) -> Matrix4<f32> {
        let translation = Vector3::new(
            width as f32 / 2.0,
            height as f32 * self.vertical_offset,
            self.depth_offset,
        );
        Transform::scale_then_translate(self.scale, translation)
    }
}

/// Up vector with Y inverted to match raster row order
pub fn screen_up() -> Vector3<f32> {
    Vector3::new(0.0, -1.0, 0.0)
}

/// The matrices built for one viewpoint
#[derive(Debug, Clone)]
pub struct CameraMatrices {
    pub projection: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub screen_map: Matrix4<f32>,
    /// Projection first, then view, then screen map
    pub combined: Matrix4<f32>,
}

impl CameraMatrices {
    pub fn affine(&self) -> Affine2 {
        Affine2::from_matrix(&self.combined)
    }
}

/// Camera configuration for a single orthographic render
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub params: CameraParams,
    pub screen: ScreenMap,
    pub width: u32,
    pub height: u32,
}

impl Camera {
    /// Aim at the box center from an orbit sample
    pub fn from_sample(
        bbox: &BoundingBox,
        sample: &OrbitSample,
        params: CameraParams,
        screen: ScreenMap,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            eye: sample.position,
            target: bbox.center(),
            up: screen_up(),
            params,
            screen,
            width,
            height,
        }
    }

    /// Create the projection matrix from two axes of the box
    pub fn projection_matrix(&self, bbox: &BoundingBox) -> Result<Matrix4<f32>> {
        let (left, right, bottom, top) = self.params.viewport_axes.bounds(bbox);

        if (right - left).abs() < MIN_EXTENT || (top - bottom).abs() < MIN_EXTENT {
            return Err(RenderError::DegenerateProjection(format!(
                "viewport {:?} has zero extent ({left}..{right}, {bottom}..{top})",
                self.params.viewport_axes
            )));
        }
        if !(self.params.far - self.params.near).is_normal() {
            return Err(RenderError::InvalidParameter(format!(
                "near {} and far {} clip planes coincide",
                self.params.near, self.params.far
            )));
        }

        Ok(Matrix4::new_orthographic(
            left,
            right,
            bottom,
            top,
            self.params.near,
            self.params.far,
        ))
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Result<Matrix4<f32>> {
        let forward = self.target - self.eye;
        if forward.norm() < MIN_EXTENT {
            return Err(RenderError::DegenerateProjection(
                "camera eye coincides with its target".to_string(),
            ));
        }
        if forward.normalize().cross(&self.up).norm() < MIN_EXTENT {
            return Err(RenderError::DegenerateProjection(
                "view direction is parallel to the up vector".to_string(),
            ));
        }

        Ok(Matrix4::look_at_rh(&self.eye, &self.target, &self.up))
    }

    pub fn matrices(&self, bbox: &BoundingBox) -> Result<CameraMatrices> {
        let projection = self.projection_matrix(bbox)?;
        let view = self.view_matrix()?;
        let screen_map = self.screen.matrix(self.width, self.height);
        let combined = Transform::chain(&projection, &view, &screen_map);

        Ok(CameraMatrices {
            projection,
            view,
            screen_map,
            combined,
        })
    }

    /// Reduce the combined matrix to the planar transform the rasterizer uses
    pub fn affine(&self, bbox: &BoundingBox) -> Result<Affine2> {
        let affine = self.matrices(bbox)?.affine();

        if !affine.is_finite() || affine.is_collapsed() {
            return Err(RenderError::DegenerateProjection(format!(
                "combined transform is singular: {affine:?}"
            )));
        }

        debug!(?affine, eye = ?self.eye, "built camera transform");
        Ok(affine)
    }
}
