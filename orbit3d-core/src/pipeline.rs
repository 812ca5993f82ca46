/// One batch render: bounds, orbit, camera, rasterize
use tracing::info;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::geometry::{BoundingBox, Scene};
use crate::orbit::{OrbitPath, OrbitSample};
use crate::projection::Camera;
use crate::raster::{Framebuffer, RasterStats, Rasterizer};
use crate::transform::Affine2;

/// Output of a render pass, ready for the encoder
#[derive(Debug, Clone)]
pub struct Frame {
    pub framebuffer: Framebuffer,
    pub bounds: BoundingBox,
    pub sample: OrbitSample,
    pub transform: Affine2,
    pub stats: RasterStats,
}

/// Bounds and orbit table for a scene, without rendering
pub fn orbit_table(scene: &Scene, config: &RenderConfig) -> Result<(BoundingBox, OrbitPath)> {
    let bounds = scene.bounding_box()?;
    let path = OrbitPath::generate(&bounds, &config.orbit)?;
    Ok((bounds, path))
}

pub fn render(scene: &Scene, config: &RenderConfig) -> Result<Frame> {
    config.validate()?;

    let (bounds, path) = orbit_table(scene, config)?;
    info!(
        min = ?bounds.min,
        max = ?bounds.max,
        radius = path.radius,
        "computed bounds and orbit"
    );

    let sample = *path.sample(config.sample_index)?;
    info!(
        index = config.sample_index,
        angle = sample.angle_degrees,
        eye = ?sample.position,
        "selected viewpoint"
    );

    let camera = Camera::from_sample(
        &bounds,
        &sample,
        config.camera,
        config.screen,
        config.raster.width,
        config.raster.height,
    );
    let transform = camera.affine(&bounds)?;

    let aliases = config.aliases();
    let mut framebuffer =
        Framebuffer::new(config.raster.width as usize, config.raster.height as usize);
    let stats = Rasterizer::new(transform, config.raster.geometry_scale, &aliases)
        .render_scene(scene, &mut framebuffer);

    info!(
        drawn = stats.drawn,
        painted = framebuffer.painted_pixels(),
        "render pass complete"
    );

    Ok(Frame {
        framebuffer,
        bounds,
        sample,
        transform,
        stats,
    })
}
