use glam::{DMat3, DMat4, DVec3, DVec4, Mat3, Mat4};

/// Convert a single precision 3x3 matrix to double precision.
pub fn upconvert_mat3(m: &Mat3) -> DMat3 {
    m.as_dmat3()
}

/// Convert a single precision 4x4 matrix to double precision.
///
/// Calibration and tracking data arrive in `f32`, every computation downstream runs in `f64`.
pub fn upconvert_mat4(m: &Mat4) -> DMat4 {
    m.as_dmat4()
}

/// Rotation of 180 degrees around the x axis.
///
/// Built from its exact entries so that applying it twice gives the identity.
pub fn rotation_x_180() -> DMat4 {
    DMat4::from_diagonal(DVec4::new(1.0, -1.0, -1.0, 1.0))
}

/// The lengths of the three columns of the rotational block.
pub fn column_scales(m: &DMat4) -> DVec3 {
    DVec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// The largest absolute element wise difference between two matrices.
pub fn max_abs_diff(a: &DMat4, b: &DMat4) -> f64 {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .fold(0.0, |acc, (x, y)| acc.max((x - y).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{DQuat, Quat, Vec3};

    #[test]
    fn rotation_x_180_is_involution() {
        let r = rotation_x_180();
        assert_eq!(r * r, DMat4::IDENTITY);
        assert_eq!(r.transform_point3(DVec3::new(1.0, 2.0, 3.0)), DVec3::new(1.0, -2.0, -3.0));

        let expected = DMat4::from_quat(DQuat::from_rotation_x(std::f64::consts::PI));
        assert!(max_abs_diff(&r, &expected) < 1e-15);
    }

    #[test]
    fn upconvert_keeps_values() {
        let m = Mat4::from_rotation_translation(Quat::from_rotation_y(0.25), Vec3::new(0.5, -1.0, 2.0));
        let d = upconvert_mat4(&m);
        for (a, b) in m.to_cols_array().iter().zip(d.to_cols_array().iter()) {
            assert_eq!(*a as f64, *b);
        }

        let k = Mat3::from_cols_array(&[1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 3.0, 4.0, 1.0]);
        assert_eq!(upconvert_mat3(&k).z_axis, DVec3::new(3.0, 4.0, 1.0));
    }

    #[test]
    fn scales_of_scaled_transform() {
        let m = DMat4::from_scale_rotation_translation(
            DVec3::new(1.0, 2.0, 0.5),
            DQuat::from_rotation_z(0.3),
            DVec3::new(4.0, 5.0, 6.0),
        );
        let s = column_scales(&m);
        assert_relative_eq!(s.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(s.z, 0.5, epsilon = 1e-12);
    }
}
