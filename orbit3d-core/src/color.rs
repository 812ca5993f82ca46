/// Normalized material color to 8-bit image channels
use crate::geometry::Color4;

/// Map a `[0, 1]` channel to a byte.
///
/// Exactly zero maps to 0; anything else maps to `floor(v * 256) - 1`,
/// clamped to `0..=255`. Non-finite input maps to 0.
pub fn channel_to_byte(v: f32) -> u8 {
    if v == 0.0 || !v.is_finite() {
        return 0;
    }
    ((v * 256.0).floor() - 1.0).clamp(0.0, 255.0) as u8
}

/// Convert a diffuse color to image channel order: alpha, red, green, blue
pub fn rgba_to_image_color(color: &Color4) -> [u8; 4] {
    [
        channel_to_byte(color.a),
        channel_to_byte(color.r),
        channel_to_byte(color.g),
        channel_to_byte(color.b),
    ]
}

/// Reorder an `[a, r, g, b]` color into framebuffer `[r, g, b, a]` order
pub fn argb_to_rgba([a, r, g, b]: [u8; 4]) -> [u8; 4] {
    [r, g, b, a]
}
