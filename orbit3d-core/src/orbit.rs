/// Tilted circular camera path around a bounding box
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::geometry::{BoundingBox, Vertex3};

/// Angles of the two closing samples appended after the sweep
pub const CLOSING_ANGLES: [u32; 2] = [360, 361];

/// What to do when `radius² - z²` goes negative for a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadicandPolicy {
    /// Treat the planar radius as zero; the camera sits above the center.
    #[default]
    ClampToZero,
    /// Abort with `RenderError::ArithmeticDomain`.
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitParams {
    /// Orbit radius as a multiple of the planar diagonal
    pub radius_factor: f32,
    pub tilt_degrees: f32,
    pub angle_step_degrees: u32,
    pub radicand_policy: RadicandPolicy,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            radius_factor: 3.0,
            tilt_degrees: 30.0,
            angle_step_degrees: 15,
            radicand_policy: RadicandPolicy::default(),
        }
    }
}

impl OrbitParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius_factor.is_finite() && self.radius_factor > 0.0) {
            return Err(RenderError::InvalidParameter(format!(
                "radius factor must be positive, got {}",
                self.radius_factor
            )));
        }
        if !self.tilt_degrees.is_finite() {
            return Err(RenderError::InvalidParameter(
                "tilt must be finite".to_string(),
            ));
        }
        if !(1..=360).contains(&self.angle_step_degrees) {
            return Err(RenderError::InvalidParameter(format!(
                "angle step must be in 1..=360, got {}",
                self.angle_step_degrees
            )));
        }
        Ok(())
    }
}

/// One camera position along the orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSample {
    pub angle_degrees: u32,
    pub position: Vertex3,
}

/// The full, ordered orbit table derived from one bounding box
#[derive(Debug, Clone)]
pub struct OrbitPath {
    pub center: Point3<f32>,
    pub radius: f32,
    pub max_height: f32,
    pub samples: Vec<OrbitSample>,
}

impl OrbitPath {
    /// Sweep `0..360` in `angle_step_degrees` steps, then append the
    /// straight-on viewpoint twice, tagged 360 and 361.
    pub fn generate(bounds: &BoundingBox, params: &OrbitParams) -> Result<Self> {
        params.validate()?;

        let center = bounds.center();
        let radius = bounds.planar_diagonal() * params.radius_factor;
        let max_height = radius * params.tilt_degrees.to_radians().sin();

        let mut samples = Vec::with_capacity(360 / params.angle_step_degrees as usize + 2);
        for angle_degrees in (0..360).step_by(params.angle_step_degrees as usize) {
            let angle = (angle_degrees as f32).to_radians();

            // Height peaks at 0 and 180 degrees, returns to center at 90 and 270
            let z = max_height * angle.cos().abs() + center.z;

            let radicand = radius * radius - z * z;
            let planar_radius = if radicand >= 0.0 {
                radicand.sqrt()
            } else {
                match params.radicand_policy {
                    RadicandPolicy::FailFast => {
                        return Err(RenderError::ArithmeticDomain {
                            angle: angle_degrees,
                            radicand,
                        });
                    }
                    RadicandPolicy::ClampToZero => {
                        warn!(angle_degrees, radicand, "negative orbit radicand clamped to zero");
                        0.0
                    }
                }
            };

            samples.push(OrbitSample {
                angle_degrees,
                position: Point3::new(
                    planar_radius * angle.cos() + center.x,
                    planar_radius * angle.sin() + center.y,
                    z,
                ),
            });
        }

        let straight_on = Point3::new(radius + center.x, center.y, center.z);
        for angle_degrees in CLOSING_ANGLES {
            samples.push(OrbitSample {
                angle_degrees,
                position: straight_on,
            });
        }

        debug!(
            radius,
            max_height,
            samples = samples.len(),
            "generated orbit path"
        );

        Ok(Self {
            center,
            radius,
            max_height,
            samples,
        })
    }

    pub fn sample(&self, index: usize) -> Result<&OrbitSample> {
        self.samples.get(index).ok_or(RenderError::SampleOutOfRange {
            index,
            len: self.samples.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_bounds() -> BoundingBox {
        BoundingBox::new(Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, 1.0, 2.0))
    }

    #[test]
    fn test_sample_count_and_ordering() {
        let path = OrbitPath::generate(&reference_bounds(), &OrbitParams::default()).unwrap();
        assert_eq!(path.len(), 24 + 2);

        let sweep = &path.samples[..24];
        for (i, sample) in sweep.iter().enumerate() {
            assert_eq!(sample.angle_degrees, i as u32 * 15);
        }
        assert!(sweep
            .windows(2)
            .all(|pair| pair[0].angle_degrees < pair[1].angle_degrees));
    }

    #[test]
    fn test_closing_samples() {
        let bounds = reference_bounds();
        let path = OrbitPath::generate(&bounds, &OrbitParams::default()).unwrap();
        let center = bounds.center();
        let expected = Point3::new(path.radius + center.x, center.y, center.z);

        let tail = &path.samples[path.len() - 2..];
        assert_eq!(tail[0].angle_degrees, 360);
        assert_eq!(tail[1].angle_degrees, 361);
        assert_eq!(tail[0].position, expected);
        assert_eq!(tail[1].position, expected);
    }

    #[test]
    fn test_height_oscillation() {
        let bounds = reference_bounds();
        let path = OrbitPath::generate(&bounds, &OrbitParams::default()).unwrap();
        let center_z = bounds.center().z;

        for sample in &path.samples[..24] {
            let lift = sample.position.z - center_z;
            match sample.angle_degrees {
                0 | 180 => assert!((lift - path.max_height).abs() < 1e-4),
                90 | 270 => assert!(lift.abs() < 1e-4),
                _ => assert!(lift >= -1e-4 && lift <= path.max_height + 1e-4),
            }
        }
    }

    #[test]
    fn test_reference_scenario() {
        let path = OrbitPath::generate(&reference_bounds(), &OrbitParams::default()).unwrap();
        assert!((path.radius - 8.485).abs() < 1e-3);
        assert!((path.max_height - 4.243).abs() < 1e-3);

        let first = path.samples[0];
        assert_eq!(first.angle_degrees, 0);
        assert!((first.position.z - 5.243).abs() < 1e-3);
        assert!((first.position.x - 6.67).abs() < 1e-2);
        assert!(first.position.y.abs() < 1e-5);
    }

    #[test]
    fn test_uneven_step_terminates() {
        let params = OrbitParams {
            angle_step_degrees: 7,
            ..OrbitParams::default()
        };
        let path = OrbitPath::generate(&reference_bounds(), &params).unwrap();
        let last_sweep = path.samples[path.len() - 3].angle_degrees;
        assert_eq!(last_sweep, 357);
        assert_eq!(path.samples[path.len() - 2].angle_degrees, 360);
        assert_eq!(path.samples[path.len() - 1].angle_degrees, 361);
    }

    #[test]
    fn test_full_turn_step() {
        let params = OrbitParams {
            angle_step_degrees: 360,
            ..OrbitParams::default()
        };
        let path = OrbitPath::generate(&reference_bounds(), &params).unwrap();
        let angles: Vec<u32> = path.samples.iter().map(|s| s.angle_degrees).collect();
        assert_eq!(angles, vec![0, 360, 361]);
    }

    #[test]
    fn test_negative_radicand_policies() {
        // Box lifted far above the origin: z exceeds the orbit radius
        let bounds = BoundingBox::new(Point3::new(-1.0, -1.0, 50.0), Point3::new(1.0, 1.0, 52.0));

        let fail = OrbitParams {
            radicand_policy: RadicandPolicy::FailFast,
            ..OrbitParams::default()
        };
        assert!(matches!(
            OrbitPath::generate(&bounds, &fail),
            Err(RenderError::ArithmeticDomain { angle: 0, .. })
        ));

        let path = OrbitPath::generate(&bounds, &OrbitParams::default()).unwrap();
        let center = bounds.center();
        for sample in &path.samples[..24] {
            assert!(sample.position.x.is_finite() && sample.position.y.is_finite());
            assert!((sample.position.x - center.x).abs() < 1e-4);
            assert!((sample.position.y - center.y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_generation_is_repeatable() {
        let bounds = reference_bounds();
        let a = OrbitPath::generate(&bounds, &OrbitParams::default()).unwrap();
        let b = OrbitPath::generate(&bounds, &OrbitParams::default()).unwrap();
        assert_eq!(a.samples, b.samples);
    }

    #[test]
    fn test_invalid_params() {
        let bounds = reference_bounds();
        for params in [
            OrbitParams {
                radius_factor: 0.0,
                ..OrbitParams::default()
            },
            OrbitParams {
                angle_step_degrees: 0,
                ..OrbitParams::default()
            },
            OrbitParams {
                angle_step_degrees: 361,
                ..OrbitParams::default()
            },
        ] {
            assert!(matches!(
                OrbitPath::generate(&bounds, &params),
                Err(RenderError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_sample_lookup() {
        let path = OrbitPath::generate(&reference_bounds(), &OrbitParams::default()).unwrap();
        assert!(path.sample(25).is_ok());
        assert!(matches!(
            path.sample(26),
            Err(RenderError::SampleOutOfRange { index: 26, len: 26 })
        ));
    }
}
