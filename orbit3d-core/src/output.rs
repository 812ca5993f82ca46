/// Framebuffer encoding through the `image` crate
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::info;

use crate::error::{RenderError, Result};
use crate::raster::Framebuffer;

pub fn to_image(framebuffer: &Framebuffer) -> Result<RgbaImage> {
    RgbaImage::from_raw(
        framebuffer.width() as u32,
        framebuffer.height() as u32,
        framebuffer.as_bytes(),
    )
    .ok_or_else(|| {
        RenderError::InvalidParameter(format!(
            "framebuffer of {}x{} does not fit an image",
            framebuffer.width(),
            framebuffer.height()
        ))
    })
}

/// Encode and write the framebuffer; the format follows the file extension
pub fn save_framebuffer(framebuffer: &Framebuffer, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)?;
    let image = to_image(framebuffer)?;

    match format {
        // No alpha channel in JPEG
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save_with_format(path, format)?,
        _ => image.save_with_format(path, format)?,
    }

    info!(path = %path.display(), ?format, "wrote image");
    Ok(())
}
