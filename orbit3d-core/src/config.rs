/// TOML render configuration
///
/// Every section falls back to defaults, so a partial file (or none at
/// all) reproduces the stock viewpoint: factor 3 orbit at 30 degrees,
/// first sample, 800x600 raster.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RenderError, Result};
use crate::orbit::OrbitParams;
use crate::projection::{CameraParams, ScreenMap};
use crate::raster::{MaterialAlias, MaterialAliases};

/// Light/body-trim material index in the stock vehicle assets
pub const BODY_TRIM_MATERIAL: usize = 3;
/// Material whose color replaces the trim
pub const BODY_FILL_MATERIAL: usize = 0;

/// Largest raster side accepted from a config
pub const MAX_RASTER_SIDE: u32 = 16384;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterParams {
    pub width: u32,
    pub height: u32,
    /// Multiplier on model x/y before the camera transform
    pub geometry_scale: f32,
}

impl Default for RasterParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            geometry_scale: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub orbit: OrbitParams,
    pub camera: CameraParams,
    pub screen: ScreenMap,
    pub raster: RasterParams,
    /// Position in the orbit table of the rendered viewpoint
    pub sample_index: usize,
    pub material_aliases: Vec<MaterialAlias>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            orbit: OrbitParams::default(),
            camera: CameraParams::default(),
            screen: ScreenMap::default(),
            raster: RasterParams::default(),
            sample_index: 0,
            material_aliases: vec![MaterialAlias {
                source: BODY_TRIM_MATERIAL,
                target: BODY_FILL_MATERIAL,
            }],
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RenderConfig = toml::from_str(content)
            .map_err(|e| RenderError::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.orbit
            .validate()
            .map_err(|e| RenderError::Config(e.to_string()))?;

        let sides = 1..=MAX_RASTER_SIDE;
        if !(sides.contains(&self.raster.width) && sides.contains(&self.raster.height)) {
            return Err(RenderError::Config(format!(
                "raster size must be within 1..={MAX_RASTER_SIDE} per side, got {}x{}",
                self.raster.width, self.raster.height
            )));
        }
        if !(self.raster.geometry_scale.is_finite() && self.raster.geometry_scale > 0.0) {
            return Err(RenderError::Config(format!(
                "geometry scale must be positive, got {}",
                self.raster.geometry_scale
            )));
        }
        let (near, far) = (self.camera.near, self.camera.far);
        if near.is_nan() || far.is_nan() || near >= far {
            return Err(RenderError::Config(format!(
                "near plane {near} must be closer than far plane {far}"
            )));
        }
        if !(self.screen.scale.is_finite() && self.screen.scale != 0.0) {
            return Err(RenderError::Config("screen scale must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn aliases(&self) -> MaterialAliases {
        self.material_aliases.iter().copied().collect()
    }
}
