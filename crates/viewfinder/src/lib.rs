#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use viewfinder_image as image;

#[doc(inline)]
pub use viewfinder_imgproc as imgproc;

#[doc(inline)]
pub use viewfinder_3d as k3d;

/// Per capture stereo cropping.
pub mod capture;

/// Configuration of the capture pipeline.
pub mod config;

/// Error types of the capture pipeline.
pub mod error;

/// Camera frames shared between the frame source and the capture.
pub mod frame;

/// Session holding the shared stereo calibration.
pub mod session;

pub use crate::capture::{capture_stereo, StereoPhoto};
pub use crate::config::CaptureConfig;
pub use crate::error::{CaptureError, EyeCaptureError};
pub use crate::frame::{LatestFrame, StereoFrame};
pub use crate::session::CaptureSession;
