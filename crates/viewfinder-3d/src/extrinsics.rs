use glam::{DMat4, DQuat, DVec3};

use crate::{
    error::{CalibrationError, RigidityViolation},
    linalg::{column_scales, max_abs_diff, rotation_x_180},
};

/// Tolerance of the rigidity checks on normalized extrinsics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RigidityTolerance {
    /// Maximum deviation of the determinant, the scales and the rebuilt matrix.
    pub epsilon: f64,
}

impl Default for RigidityTolerance {
    fn default() -> Self {
        Self { epsilon: 1e-6 }
    }
}

/// Compute the device relative view transform of a camera from its raw extrinsics.
///
/// Raw extrinsics are given in the camera local convention. The view transform is the
/// inverse of the raw transform rotated by 180 degrees around x, and must be rigid:
///
/// 1. the determinant of its rotational block is one,
/// 2. the columns of its rotational block have unit length,
/// 3. rebuilding it from its rotation and translation alone gives the same matrix.
///
/// # Errors
///
/// [`CalibrationError::NotRigidExtrinsics`] naming the first failed check.
pub fn view_transform_from_extrinsics(
    raw: &DMat4,
    tolerance: &RigidityTolerance,
) -> Result<DMat4, CalibrationError> {
    let view = (rotation_x_180() * *raw).inverse();
    check_rigid(&view, tolerance.epsilon).map_err(CalibrationError::NotRigidExtrinsics)?;
    Ok(view)
}

fn check_rigid(m: &DMat4, epsilon: f64) -> Result<(), RigidityViolation> {
    let det = m.determinant();
    if !((det - 1.0).abs() < epsilon) {
        return Err(RigidityViolation::Determinant(det));
    }

    let scale = column_scales(m);
    if !scale.cmplt(DVec3::splat(1.0 + epsilon)).all()
        || !scale.cmpgt(DVec3::splat(1.0 - epsilon)).all()
    {
        return Err(RigidityViolation::Scale(scale.to_array()));
    }

    let (_, rotation, translation) = m.to_scale_rotation_translation();
    let rebuilt = DMat4::from_rotation_translation(rotation, translation);
    if !(max_abs_diff(m, &rebuilt) <= epsilon) {
        return Err(RigidityViolation::Shear);
    }

    Ok(())
}

/// The pose of a camera in world coordinates.
///
/// Maps camera space points, where the camera looks down `-z`, to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    matrix: DMat4,
}

impl CameraPose {
    /// Compose a validated device relative view transform with the device world transform.
    pub fn from_view(view: &DMat4, device: &DMat4) -> Self {
        Self {
            matrix: *device * *view,
        }
    }

    /// Normalize raw extrinsics and place the camera in the world.
    ///
    /// See [`view_transform_from_extrinsics`] for the normalization and its checks.
    pub fn from_extrinsics(
        raw: &DMat4,
        device: &DMat4,
        tolerance: &RigidityTolerance,
    ) -> Result<Self, CalibrationError> {
        let view = view_transform_from_extrinsics(raw, tolerance)?;
        Ok(Self::from_view(&view, device))
    }

    /// The camera to world matrix.
    pub fn matrix(&self) -> &DMat4 {
        &self.matrix
    }

    /// The world to camera matrix.
    pub fn inverse(&self) -> DMat4 {
        self.matrix.inverse()
    }

    /// Map a camera space point to world space.
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.matrix.transform_point3(point)
    }

    /// The camera center in world space.
    pub fn translation(&self) -> DVec3 {
        self.matrix.w_axis.truncate()
    }

    /// The camera orientation in world space.
    pub fn rotation(&self) -> DQuat {
        let (_, rotation, _) = self.matrix.to_scale_rotation_translation();
        rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::upconvert_mat4;
    use approx::assert_relative_eq;
    use glam::Mat4;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_rigid(rng: &mut StdRng) -> DMat4 {
        let axis = DVec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        )
        .try_normalize()
        .unwrap_or(DVec3::Y);
        let angle = rng.random_range(-std::f64::consts::PI..std::f64::consts::PI);
        let translation = DVec3::new(
            rng.random_range(-0.1..0.1),
            rng.random_range(-0.1..0.1),
            rng.random_range(-0.1..0.1),
        );
        DMat4::from_rotation_translation(DQuat::from_axis_angle(axis, angle), translation)
    }

    #[test]
    fn rigid_extrinsics_are_accepted() -> Result<(), CalibrationError> {
        let mut rng = StdRng::seed_from_u64(7);
        let tolerance = RigidityTolerance::default();

        for _ in 0..100 {
            let raw = random_rigid(&mut rng);
            let view = view_transform_from_extrinsics(&raw, &tolerance)?;

            assert_relative_eq!(view.determinant(), 1.0, epsilon = 1e-6);
            let scale = column_scales(&view);
            for s in scale.to_array() {
                assert_relative_eq!(s, 1.0, epsilon = 1e-6);
            }

            // the view undoes the flipped raw transform
            let round_trip = view * rotation_x_180() * raw;
            assert!(max_abs_diff(&round_trip, &DMat4::IDENTITY) < 1e-9);
        }

        Ok(())
    }

    #[test]
    fn single_precision_extrinsics_are_accepted() -> Result<(), CalibrationError> {
        // what the hardware delivers: a rigid transform rounded to f32
        let raw: Mat4 = DMat4::from_rotation_translation(
            DQuat::from_rotation_y(0.1) * DQuat::from_rotation_x(std::f64::consts::PI),
            DVec3::new(0.025, -0.02, -0.05),
        )
        .as_mat4();
        view_transform_from_extrinsics(&upconvert_mat4(&raw), &RigidityTolerance::default())?;
        Ok(())
    }

    #[test]
    fn flipped_identity_gives_identity_view() -> Result<(), CalibrationError> {
        let view = view_transform_from_extrinsics(&rotation_x_180(), &RigidityTolerance::default())?;
        assert_eq!(view, DMat4::IDENTITY);
        Ok(())
    }

    #[test]
    fn nonuniform_scale_is_rejected() {
        let raw = DMat4::from_scale_rotation_translation(
            DVec3::new(1.0, 1.01, 1.0),
            DQuat::from_rotation_z(0.2),
            DVec3::new(0.1, 0.0, 0.0),
        );
        let res = view_transform_from_extrinsics(&raw, &RigidityTolerance::default());
        assert!(matches!(res, Err(CalibrationError::NotRigidExtrinsics(_))));
    }

    #[test]
    fn volume_preserving_scale_is_rejected() {
        // determinant one, but not a rotation
        let raw = DMat4::from_scale(DVec3::new(2.0, 0.5, 1.0));
        let res = view_transform_from_extrinsics(&raw, &RigidityTolerance::default());
        assert!(matches!(
            res,
            Err(CalibrationError::NotRigidExtrinsics(RigidityViolation::Scale(_)))
        ));
    }

    #[test]
    fn reflection_is_rejected() {
        let raw = DMat4::from_scale(DVec3::new(-1.0, 1.0, 1.0));
        let res = view_transform_from_extrinsics(&raw, &RigidityTolerance::default());
        assert_eq!(
            res,
            Err(CalibrationError::NotRigidExtrinsics(
                RigidityViolation::Determinant(-1.0)
            ))
        );
    }

    #[test]
    fn projective_terms_are_rejected() {
        let mut raw = DMat4::IDENTITY;
        raw.x_axis.w = 0.5;
        let res = view_transform_from_extrinsics(&raw, &RigidityTolerance::default());
        assert_eq!(
            res,
            Err(CalibrationError::NotRigidExtrinsics(RigidityViolation::Shear))
        );
    }

    #[test]
    fn singular_extrinsics_are_rejected() {
        let res = view_transform_from_extrinsics(&DMat4::ZERO, &RigidityTolerance::default());
        assert!(matches!(
            res,
            Err(CalibrationError::NotRigidExtrinsics(
                RigidityViolation::Determinant(_)
            ))
        ));
    }

    #[test]
    fn pose_composes_device_and_view() -> Result<(), CalibrationError> {
        let device = DMat4::from_rotation_translation(
            DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2),
            DVec3::new(1.0, 1.6, -2.0),
        );
        let pose = CameraPose::from_extrinsics(&rotation_x_180(), &device, &RigidityTolerance::default())?;

        assert_eq!(*pose.matrix(), device);
        assert_eq!(pose.translation(), DVec3::new(1.0, 1.6, -2.0));
        assert!(pose
            .rotation()
            .abs_diff_eq(DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2), 1e-12));

        let p = DVec3::new(0.3, -0.2, -1.5);
        let back = pose.inverse().transform_point3(pose.transform_point(p));
        assert!(back.abs_diff_eq(p, 1e-12));

        Ok(())
    }
}
