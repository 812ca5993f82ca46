/// Orbit3D Core Library - orbit viewpoints and flat-shaded orthographic renders
///
/// This library derives a tilted camera orbit around a mesh's bounding box,
/// builds the orthographic transform for one orbit sample, and rasterizes the
/// mesh into an RGBA framebuffer with one flat color per face.

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod import;
pub mod orbit;
pub mod output;
pub mod pipeline;
pub mod projection;
pub mod raster;
pub mod transform;

// Re-export commonly used types
pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use geometry::{BoundingBox, Color4, Face, Material, Mesh, Scene, Vertex3};
pub use orbit::{OrbitParams, OrbitPath, OrbitSample, RadicandPolicy};
pub use pipeline::{render, Frame};
pub use projection::{Camera, CameraParams, ScreenMap, ViewportAxes};
pub use raster::{Framebuffer, MaterialAlias, MaterialAliases, Rasterizer};
pub use transform::{Affine2, Transform};
