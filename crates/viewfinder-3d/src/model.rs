use glam::{DMat4, Mat3, Mat4};
use viewfinder_image::ImageSize;

use crate::{
    error::CalibrationError,
    extrinsics::{view_transform_from_extrinsics, CameraPose, RigidityTolerance},
    intrinsics::{IntrinsicsTolerance, SimplifiedIntrinsics},
    linalg::{max_abs_diff, upconvert_mat3, upconvert_mat4},
};

/// One of the two cameras of the stereo rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Eye {
    /// The left camera.
    Left,
    /// The right camera.
    Right,
}

impl std::fmt::Display for Eye {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Eye::Left => write!(f, "left"),
            Eye::Right => write!(f, "right"),
        }
    }
}

/// Per eye calibration as reported by the camera hardware, in single precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawCalibration {
    /// Left calibration matrix `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]` in row notation,
    /// i.e. with `cx, cy` in the third column (`z_axis`).
    ///
    /// Hardware that stores the principal point in the bottom row (`x_axis.z`,
    /// `y_axis.z`) must hand over the transpose of its matrix, otherwise the principal
    /// point reads as `(0, 0)` and validation fails.
    pub left_intrinsics: Mat3,
    /// Right calibration matrix, same layout as the left one.
    pub right_intrinsics: Mat3,
    /// Left camera transform relative to the device, camera local convention.
    pub left_extrinsics: Mat4,
    /// Right camera transform relative to the device.
    pub right_extrinsics: Mat4,
    /// Resolution of the camera frames.
    pub resolution: ImageSize,
}

/// All tolerances used while validating a calibration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationTolerance {
    /// Tolerances of the intrinsics checks.
    pub intrinsics: IntrinsicsTolerance,
    /// Tolerance of the extrinsics rigidity checks.
    pub rigidity: RigidityTolerance,
}

/// A validated stereo calibration with device relative camera views.
///
/// Built once per session. Combine it with the device pose of a capture using
/// [`StereoCalibration::locate`] to get a [`CameraModel`] in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoCalibration {
    intrinsics: SimplifiedIntrinsics,
    left_view: DMat4,
    right_view: DMat4,
    resolution: ImageSize,
}

impl StereoCalibration {
    /// Validate raw calibration data.
    ///
    /// The left and right intrinsics must match since both eyes share one set of simplified
    /// intrinsics, extracted from the left matrix. Both extrinsics must normalize to rigid
    /// view transforms.
    pub fn new(
        raw: &RawCalibration,
        tolerance: &CalibrationTolerance,
    ) -> Result<Self, CalibrationError> {
        let left_k = upconvert_mat3(&raw.left_intrinsics);
        let right_k = upconvert_mat3(&raw.right_intrinsics);

        if !left_k.abs_diff_eq(right_k, tolerance.intrinsics.stereo) {
            return Err(CalibrationError::AsymmetricStereoIntrinsics);
        }

        let intrinsics =
            SimplifiedIntrinsics::from_matrix(&left_k, raw.resolution, &tolerance.intrinsics)?;

        let left_view =
            view_transform_from_extrinsics(&upconvert_mat4(&raw.left_extrinsics), &tolerance.rigidity)?;
        let right_view = view_transform_from_extrinsics(
            &upconvert_mat4(&raw.right_extrinsics),
            &tolerance.rigidity,
        )?;

        log::info!(
            "stereo calibration at {}: vertical fov {:.3} deg, aspect {:.4}, baseline {:.4}",
            raw.resolution,
            intrinsics.vertical_fov_degrees(),
            intrinsics.aspect_ratio,
            (left_view.w_axis - right_view.w_axis).truncate().length(),
        );

        Ok(Self {
            intrinsics,
            left_view,
            right_view,
            resolution: raw.resolution,
        })
    }

    /// The shared simplified intrinsics.
    pub fn intrinsics(&self) -> &SimplifiedIntrinsics {
        &self.intrinsics
    }

    /// The resolution of the camera frames.
    pub fn resolution(&self) -> ImageSize {
        self.resolution
    }

    /// The device relative view transform of an eye.
    pub fn view(&self, eye: Eye) -> &DMat4 {
        match eye {
            Eye::Left => &self.left_view,
            Eye::Right => &self.right_view,
        }
    }

    /// Place both cameras in the world using the device transform of a capture.
    pub fn locate(&self, device: &DMat4) -> CameraModel {
        CameraModel {
            intrinsics: self.intrinsics,
            left_pose: CameraPose::from_view(&self.left_view, device),
            right_pose: CameraPose::from_view(&self.right_view, device),
            resolution: self.resolution,
        }
    }

    /// The largest element wise difference between the view transforms of two calibrations.
    ///
    /// Useful to decide whether a new calibration differs from the current one.
    pub fn max_view_difference(&self, other: &StereoCalibration) -> f64 {
        max_abs_diff(&self.left_view, &other.left_view)
            .max(max_abs_diff(&self.right_view, &other.right_view))
    }
}

/// Intrinsics and world poses of both cameras for a single capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    intrinsics: SimplifiedIntrinsics,
    left_pose: CameraPose,
    right_pose: CameraPose,
    resolution: ImageSize,
}

impl CameraModel {
    /// Validate raw calibration and place the cameras at the device transform in one step.
    pub fn from_raw(
        raw: &RawCalibration,
        device: &DMat4,
        tolerance: &CalibrationTolerance,
    ) -> Result<Self, CalibrationError> {
        Ok(StereoCalibration::new(raw, tolerance)?.locate(device))
    }

    /// The world pose of an eye.
    pub fn pose(&self, eye: Eye) -> &CameraPose {
        match eye {
            Eye::Left => &self.left_pose,
            Eye::Right => &self.right_pose,
        }
    }

    /// The shared simplified intrinsics.
    pub fn intrinsics(&self) -> &SimplifiedIntrinsics {
        &self.intrinsics
    }

    /// The resolution of the camera frames.
    pub fn resolution(&self) -> ImageSize {
        self.resolution
    }
}
