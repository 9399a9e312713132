use serde::{Deserialize, Serialize};
use viewfinder_3d::model::CalibrationTolerance;
use viewfinder_imgproc::rectify::{CropStrictness, RectifyOptions, DEFAULT_SHORTEST_SIDE};

use crate::error::CaptureError;

/// Configuration of the capture pipeline.
///
/// Every field is optional in the serialized form and falls back to its default.
///
/// # Example
///
/// ```
/// use viewfinder::CaptureConfig;
/// use viewfinder::imgproc::rectify::CropStrictness;
///
/// let config = CaptureConfig::from_json_str(r#"{ "strictness": "strict" }"#).unwrap();
/// assert_eq!(config.strictness, CropStrictness::Strict);
/// assert_eq!(config.shortest_side, 1080);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// How much of the viewfinder must be visible to a camera.
    pub strictness: CropStrictness,
    /// Length of the shortest side of the output photos in pixels.
    pub shortest_side: usize,
    /// Interpolation of the rectifier.
    pub rectify: RectifyOptions,
    /// Tolerances of the calibration checks.
    pub tolerance: CalibrationTolerance,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            strictness: CropStrictness::default(),
            shortest_side: DEFAULT_SHORTEST_SIDE,
            rectify: RectifyOptions::default(),
            tolerance: CalibrationTolerance::default(),
        }
    }
}

impl CaptureConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to pretty printed JSON.
    pub fn to_json_string(&self) -> Result<String, CaptureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_imgproc::interpolation::InterpolationMode;

    #[test]
    fn empty_json_gives_defaults() -> Result<(), CaptureError> {
        assert_eq!(CaptureConfig::from_json_str("{}")?, CaptureConfig::default());
        Ok(())
    }

    #[test]
    fn nested_fields() -> Result<(), CaptureError> {
        let config = CaptureConfig::from_json_str(
            r#"{
                "strictness": "loose",
                "shortest_side": 720,
                "rectify": { "interpolation": "nearest" },
                "tolerance": { "intrinsics": { "focal": 0.5 }, "rigidity": { "epsilon": 1e-5 } }
            }"#,
        )?;

        assert_eq!(config.strictness, CropStrictness::Loose);
        assert_eq!(config.shortest_side, 720);
        assert_eq!(config.rectify.interpolation, InterpolationMode::Nearest);
        assert_eq!(config.tolerance.intrinsics.focal, 0.5);
        assert_eq!(config.tolerance.intrinsics.principal_point, 0.0);
        approx::assert_relative_eq!(config.tolerance.rigidity.epsilon, 1e-5);

        Ok(())
    }

    #[test]
    fn json_round_trip() -> Result<(), CaptureError> {
        let config = CaptureConfig {
            strictness: CropStrictness::Strict,
            ..Default::default()
        };
        let parsed = CaptureConfig::from_json_str(&config.to_json_string()?)?;
        assert_eq!(parsed.strictness, config.strictness);
        assert_eq!(parsed.shortest_side, config.shortest_side);
        assert_eq!(parsed.rectify, config.rectify);
        approx::assert_relative_eq!(
            parsed.tolerance.rigidity.epsilon,
            config.tolerance.rigidity.epsilon
        );
        Ok(())
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let res = CaptureConfig::from_json_str(r#"{ "strictness": "sloppy" }"#);
        assert!(matches!(res, Err(CaptureError::Config(_))));
    }
}
