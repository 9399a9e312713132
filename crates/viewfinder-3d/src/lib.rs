#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for calibration and projection.
pub mod error;

/// Normalization of raw per-eye extrinsics into rigid camera poses.
pub mod extrinsics;

/// Extraction of simplified pinhole intrinsics from raw calibration.
pub mod intrinsics;

/// Linear algebra utilities.
pub mod linalg;

/// Stereo calibration and the per-capture camera model.
pub mod model;

/// Projection of world points into camera pixels.
pub mod projector;

pub use crate::error::{CalibrationError, ProjectionError, RigidityViolation};
pub use crate::model::{CameraModel, Eye, RawCalibration, StereoCalibration};
