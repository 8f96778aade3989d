pub use glam::{DQuat, DVec2, DVec3};

/// Values below this are treated as zero by the constraint and frame math.
pub const EPSILON: f64 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Transform {
    pub scale: mint::Vector3<f64>,
    pub rotation: mint::Quaternion<f64>,
    pub translation: mint::Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE.into(),
            rotation: DQuat::IDENTITY.into(),
            translation: DVec3::ZERO.into(),
        }
    }
}

impl Transform {
    pub fn from_scale_rotation_translation(
        scale: impl Into<mint::Vector3<f64>>,
        rotation: impl Into<mint::Quaternion<f64>>,
        translation: impl Into<mint::Vector3<f64>>,
    ) -> Self {
        Self {
            scale: scale.into(),
            rotation: rotation.into(),
            translation: translation.into(),
        }
    }
}

/// Projects `vector` on the line spanned by `direction`.
///
/// `direction` does not need to be normalized. A degenerate direction
/// leaves the vector untouched.
pub fn project_on_axis(vector: DVec3, direction: DVec3) -> DVec3 {
    let norm = direction.length_squared();
    if norm < EPSILON {
        return vector;
    }
    direction * (vector.dot(direction) / norm)
}

/// Projects `vector` on the plane whose normal is `normal`.
pub fn project_on_plane(vector: DVec3, normal: DVec3) -> DVec3 {
    let norm = normal.length_squared();
    if norm < EPSILON {
        return vector;
    }
    vector - normal * (vector.dot(normal) / norm)
}

/// Builds a rotation of `angle` radians around `axis`.
///
/// The axis does not need to be normalized; a near-zero axis yields the identity.
pub fn quat_from_axis_angle(axis: DVec3, angle: f64) -> DQuat {
    let length = axis.length();
    if length < EPSILON {
        DQuat::IDENTITY
    } else {
        DQuat::from_axis_angle(axis / length, angle)
    }
}

/// Rotation angle, in radians, encoded by the scalar part of a unit quaternion.
pub fn quat_angle(rotation: DQuat) -> f64 {
    2.0 * rotation.w.clamp(-1.0, 1.0).acos()
}

pub(crate) fn is_near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_projection_keeps_the_axial_component() {
        let projected = project_on_axis(DVec3::new(3.0, 4.0, 5.0), DVec3::new(0.0, 2.0, 0.0));
        assert!(projected.abs_diff_eq(DVec3::new(0.0, 4.0, 0.0), 1e-12));
    }

    #[test]
    fn plane_projection_removes_the_normal_component() {
        let projected = project_on_plane(DVec3::new(3.0, 4.0, 5.0), DVec3::Z);
        assert!(projected.abs_diff_eq(DVec3::new(3.0, 4.0, 0.0), 1e-12));
    }

    #[test]
    fn degenerate_axis_yields_identity_rotation() {
        assert_eq!(quat_from_axis_angle(DVec3::ZERO, 1.0), DQuat::IDENTITY);
    }

    #[test]
    fn angle_round_trips_through_quaternion() {
        let rotation = DQuat::from_axis_angle(DVec3::Y, 0.75);
        assert!((quat_angle(rotation) - 0.75).abs() < 1e-12);
    }
}
