/// The rigidity check that a transform failed.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RigidityViolation {
    /// The determinant of the rotational block is not one.
    #[error("determinant is {0}, expected 1")]
    Determinant(f64),

    /// The columns of the rotational block do not have unit length.
    #[error("scale is {0:?}, expected [1, 1, 1]")]
    Scale([f64; 3]),

    /// The transform differs from the one rebuilt from its rotation and translation.
    #[error("transform contains shear or projective terms")]
    Shear,
}

/// An error type for building camera models from raw calibration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// The focal lengths along x and y differ.
    #[error("Pixels are not square: fx = {fx}, fy = {fy}")]
    NonSquarePixels {
        /// Focal length along x in pixels.
        fx: f64,
        /// Focal length along y in pixels.
        fy: f64,
    },

    /// The principal point is not at the image center.
    #[error("Principal point implies an image of {implied:?}, actual image is {actual:?}")]
    PrincipalPointNotCentered {
        /// The resolution `[2 cx, 2 cy]` implied by the principal point.
        implied: [f64; 2],
        /// The actual resolution `[W, H]`.
        actual: [f64; 2],
    },

    /// The left and right intrinsic matrices differ, which the stereo model does not support.
    #[error("Left and right camera intrinsics differ, unsupported hardware")]
    AsymmetricStereoIntrinsics,

    /// The extrinsics are not a pure rotation and translation.
    #[error("Extrinsics are not a rigid transform: {0}")]
    NotRigidExtrinsics(RigidityViolation),
}

/// An error type for the world to camera projection.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    /// The point is on or behind the camera plane.
    #[error("Point is not in front of the camera (camera space z = {depth})")]
    PointBehindCamera {
        /// The camera space z coordinate of the point.
        depth: f64,
    },
}
