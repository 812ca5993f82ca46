/// Error type shared by every stage of the render pipeline
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// No vertices to bound.
    #[error("geometry is empty: no vertices to bound")]
    EmptyGeometry,

    #[error("failed to import mesh: {0}")]
    Import(String),

    /// Negative radicand while projecting the orbit radius onto the XY plane.
    #[error("orbit radius is undefined at {angle} degrees (radicand {radicand})")]
    ArithmeticDomain { angle: u32, radicand: f32 },

    #[error("degenerate projection: {0}")]
    DegenerateProjection(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("orbit sample {index} out of range ({len} samples)")]
    SampleOutOfRange { index: usize, len: usize },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
