use glam::DMat3;
use viewfinder_image::ImageSize;

use crate::error::CalibrationError;

/// Tolerances for the intrinsics checks.
///
/// All default to zero, i.e. the checks require exact equality, which holds for
/// hardware that reports its calibration in closed form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntrinsicsTolerance {
    /// Maximum allowed `|fx - fy|` in pixels.
    pub focal: f64,
    /// Maximum allowed `|2 c - size|` in pixels, per axis.
    pub principal_point: f64,
    /// Maximum allowed element wise difference between the left and right matrices.
    pub stereo: f64,
}

/// Full pinhole parameters in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeIntrinsics {
    /// Focal length along x.
    pub fx: f64,
    /// Focal length along y.
    pub fy: f64,
    /// Principal point x.
    pub cx: f64,
    /// Principal point y.
    pub cy: f64,
}

/// A pinhole camera with square pixels and a centered principal point.
///
/// Described by its vertical field of view and aspect ratio only, which is enough to
/// rebuild the full pinhole model at a given resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifiedIntrinsics {
    /// Vertical field of view in radians.
    pub vertical_fov: f64,
    /// Width over height.
    pub aspect_ratio: f64,
}

impl SimplifiedIntrinsics {
    /// Extract the simplified intrinsics from a calibration matrix.
    ///
    /// # Arguments
    ///
    /// * `k` - The calibration matrix `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`.
    /// * `resolution` - The actual image resolution.
    /// * `tolerance` - The tolerances of the square pixel and centered principal point checks.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::NonSquarePixels`] if `|fx - fy|` exceeds the tolerance and
    /// [`CalibrationError::PrincipalPointNotCentered`] if `(2 cx, 2 cy)` is not the resolution.
    ///
    /// # Example
    ///
    /// ```
    /// use glam::DMat3;
    /// use viewfinder_3d::intrinsics::{IntrinsicsTolerance, SimplifiedIntrinsics};
    /// use viewfinder_image::ImageSize;
    ///
    /// let k = DMat3::from_cols_array_2d(&[[800.0, 0.0, 0.0], [0.0, 800.0, 0.0], [320.0, 240.0, 1.0]]);
    /// let size = ImageSize { width: 640, height: 480 };
    ///
    /// let intrinsics = SimplifiedIntrinsics::from_matrix(&k, size, &IntrinsicsTolerance::default()).unwrap();
    /// assert_eq!(intrinsics.aspect_ratio, 640.0 / 480.0);
    /// ```
    pub fn from_matrix(
        k: &DMat3,
        resolution: ImageSize,
        tolerance: &IntrinsicsTolerance,
    ) -> Result<Self, CalibrationError> {
        // glam is column major, element (row, col) is col_axis.row
        let (fx, fy) = (k.x_axis.x, k.y_axis.y);
        let (cx, cy) = (k.z_axis.x, k.z_axis.y);

        if !((fx - fy).abs() <= tolerance.focal) {
            return Err(CalibrationError::NonSquarePixels { fx, fy });
        }

        let implied = [2.0 * cx, 2.0 * cy];
        let actual = [resolution.width as f64, resolution.height as f64];

        let centered = implied
            .iter()
            .zip(actual.iter())
            .all(|(i, a)| (i - a).abs() <= tolerance.principal_point);

        if !centered {
            return Err(CalibrationError::PrincipalPointNotCentered { implied, actual });
        }

        let (w, h) = (actual[0], actual[1]);

        Ok(Self {
            vertical_fov: 2.0 * ((h * 0.5) / fy).atan(),
            aspect_ratio: w / h,
        })
    }

    /// Same as [`SimplifiedIntrinsics::from_matrix`] with the matrix given as rows.
    pub fn from_rows(
        rows: &[[f64; 3]; 3],
        resolution: ImageSize,
        tolerance: &IntrinsicsTolerance,
    ) -> Result<Self, CalibrationError> {
        Self::from_matrix(
            &DMat3::from_cols_array_2d(rows).transpose(),
            resolution,
            tolerance,
        )
    }

    /// The focal length in pixels at the given resolution.
    pub fn focal_length(&self, resolution: ImageSize) -> f64 {
        (resolution.height as f64 * 0.5) / (self.vertical_fov * 0.5).tan()
    }

    /// Rebuild the full pinhole parameters at the given resolution.
    pub fn pinhole(&self, resolution: ImageSize) -> PinholeIntrinsics {
        let f = self.focal_length(resolution);
        PinholeIntrinsics {
            fx: f,
            fy: f,
            cx: resolution.width as f64 * 0.5,
            cy: resolution.height as f64 * 0.5,
        }
    }

    /// Vertical field of view in degrees.
    pub fn vertical_fov_degrees(&self) -> f64 {
        self.vertical_fov.to_degrees()
    }

    /// Horizontal field of view in radians.
    pub fn horizontal_fov(&self) -> f64 {
        2.0 * (self.aspect_ratio * (self.vertical_fov * 0.5).tan()).atan()
    }
}
