use viewfinder_3d::{CalibrationError, Eye, ProjectionError};
use viewfinder_image::ImageSize;
use viewfinder_imgproc::rectify::RectifyError;

/// An error for a single eye of a stereo capture.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EyeCaptureError {
    /// The camera frame does not have the calibrated resolution.
    #[error("Frame of {actual} does not match the calibrated {expected}")]
    FrameSizeMismatch {
        /// The calibrated resolution.
        expected: ImageSize,
        /// The resolution of the frame.
        actual: ImageSize,
    },

    /// A viewfinder corner could not be projected.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The projected region could not be cropped.
    #[error(transparent)]
    Rectify(#[from] RectifyError),
}

/// An error type for the capture pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    /// The calibration could not be turned into a camera model.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// The capture failed for one eye.
    #[error("Capture failed for the {eye} eye: {source}")]
    Eye {
        /// The eye that failed.
        eye: Eye,
        /// What went wrong.
        source: EyeCaptureError,
    },

    /// No camera frame has been published yet.
    #[error("No camera frame has been received yet")]
    FrameNotReady,

    /// The session has no calibration.
    #[error("The capture session has not been started")]
    SessionNotStarted,

    /// The physical viewfinder size does not give a valid output size.
    #[error("Invalid viewfinder size {width}x{height}")]
    InvalidViewfinderSize {
        /// Physical width.
        width: f64,
        /// Physical height.
        height: f64,
    },

    /// The configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
