//! Constraints restricting how a [`Frame`] may translate, rotate and scale.
//!
//! A constraint receives the raw delta computed from user input together with the
//! frame it is about to be applied to, and returns the filtered delta.
//! [`AxisPlaneConstraint`] covers the usual cases: translation and rotation are each
//! free, limited to an axis or a plane, or forbidden, with the direction expressed in
//! world, local or camera coordinates (see [`ConstraintSpace`]).

use std::fmt::Debug;

use tracing::warn;

use crate::frame::{Frame, SharedFrame};
use crate::math::{
    is_near_zero, project_on_axis, project_on_plane, quat_angle, quat_from_axis_angle, DQuat,
    DVec3, EPSILON,
};

/// Filters the translation, rotation and scaling deltas applied to a frame.
///
/// Every method defaults to the identity, so implementors only override what they restrict.
pub trait Constraint: Debug {
    /// Filters a translation expressed in the frame's reference frame.
    fn constrain_translation(&self, translation: DVec3, _frame: &Frame) -> DVec3 {
        translation
    }

    /// Filters a rotation expressed in the frame's own coordinates.
    fn constrain_rotation(&self, rotation: DQuat, _frame: &Frame) -> DQuat {
        rotation
    }

    /// Filters a component-wise scaling factor.
    fn constrain_scaling(&self, scaling: DVec3, _frame: &Frame) -> DVec3 {
        scaling
    }
}

/// Restriction applied to one kind of motion.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum AxisPlane {
    /// No restriction.
    #[default]
    Free,
    /// Motion is limited to the given direction.
    Axis(DVec3),
    /// Motion is limited to the plane with the given normal. Rotations ignore this.
    Plane(DVec3),
    /// No motion at all.
    Forbidden,
}

impl AxisPlane {
    /// Restriction to `direction`. A near-zero direction is rejected in favor of [`AxisPlane::Free`].
    pub fn axis(direction: impl Into<mint::Vector3<f64>>) -> Self {
        let direction: mint::Vector3<f64> = direction.into();
        match Self::normalized(direction.into()) {
            Some(direction) => Self::Axis(direction),
            None => {
                warn!("Null vector given as an axis constraint direction, falling back to free motion");
                Self::Free
            }
        }
    }

    /// Restriction to the plane of `normal`. A near-zero normal is rejected in favor of [`AxisPlane::Free`].
    pub fn plane(normal: impl Into<mint::Vector3<f64>>) -> Self {
        let normal: mint::Vector3<f64> = normal.into();
        match Self::normalized(normal.into()) {
            Some(normal) => Self::Plane(normal),
            None => {
                warn!("Null vector given as a plane constraint normal, falling back to free motion");
                Self::Free
            }
        }
    }

    /// Axis direction or plane normal, if any.
    pub fn direction(&self) -> Option<DVec3> {
        match *self {
            Self::Axis(direction) | Self::Plane(direction) => Some(direction),
            Self::Free | Self::Forbidden => None,
        }
    }

    fn normalized(direction: DVec3) -> Option<DVec3> {
        (direction.length_squared() >= EPSILON).then(|| direction.normalize())
    }
}

/// Coordinate system in which the directions of an [`AxisPlaneConstraint`] are expressed.
#[derive(Debug, Clone, Default)]
pub enum ConstraintSpace {
    /// Directions are world directions.
    #[default]
    World,
    /// Directions are expressed in the constrained frame.
    Local,
    /// Directions are expressed in the given camera frame.
    Camera(SharedFrame),
}

/// Per-axis scaling restriction.
///
/// Each component is either `0` (scaling on that axis is forbidden), `1` (free) or
/// any other value, a ratio. When exactly one component is `1`, that axis drives
/// the scaling: every other non-zero axis follows the driving axis' input times its
/// own ratio. Without a single driving axis, non-zero axes scale independently.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScalingConstraint {
    values: DVec3,
}

impl Default for ScalingConstraint {
    fn default() -> Self {
        Self { values: DVec3::ONE }
    }
}

impl ScalingConstraint {
    pub fn new(values: impl Into<mint::Vector3<f64>>) -> Self {
        let values: mint::Vector3<f64> = values.into();
        Self {
            values: values.into(),
        }
    }

    pub fn values(&self) -> DVec3 {
        self.values
    }

    /// Index of the axis whose input drives the coupled axes.
    pub fn driving_axis(&self) -> Option<usize> {
        let mut driving = None;
        for (axis, value) in self.values.to_array().into_iter().enumerate() {
            if is_near_zero(value - 1.0) {
                if driving.is_some() {
                    return None;
                }
                driving = Some(axis);
            }
        }
        driving
    }

    pub fn apply(&self, scaling: DVec3) -> DVec3 {
        let input = scaling
            .to_array()
            .map(|value| if is_near_zero(value) { 1.0 } else { value });
        let values = self.values.to_array();
        let driving = self.driving_axis();

        let mut output = [1.0; 3];
        for axis in 0..3 {
            output[axis] = if is_near_zero(values[axis]) {
                1.0
            } else {
                match driving {
                    Some(driving) if driving == axis => input[axis],
                    Some(driving) => input[driving] * values[axis],
                    None => input[axis],
                }
            };
        }
        DVec3::from_array(output)
    }
}

/// Limits translation and rotation to an axis or a plane, or forbids them,
/// independently, and restricts scaling per axis.
#[derive(Debug, Clone, Default)]
pub struct AxisPlaneConstraint {
    space: ConstraintSpace,
    translation: AxisPlane,
    rotation: AxisPlane,
    scaling: ScalingConstraint,
}

impl AxisPlaneConstraint {
    /// Constraint with directions expressed in world coordinates.
    pub fn world() -> Self {
        Self::default()
    }

    /// Constraint with directions expressed in the constrained frame.
    pub fn local() -> Self {
        Self {
            space: ConstraintSpace::Local,
            ..Self::default()
        }
    }

    /// Constraint with directions expressed in `camera`'s frame.
    pub fn camera(camera: SharedFrame) -> Self {
        Self {
            space: ConstraintSpace::Camera(camera),
            ..Self::default()
        }
    }

    pub fn with_translation(mut self, translation: AxisPlane) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: AxisPlane) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scaling(mut self, values: impl Into<mint::Vector3<f64>>) -> Self {
        self.scaling = ScalingConstraint::new(values);
        self
    }

    pub fn space(&self) -> &ConstraintSpace {
        &self.space
    }

    pub fn translation_constraint(&self) -> AxisPlane {
        self.translation
    }

    pub fn set_translation_constraint(&mut self, translation: AxisPlane) {
        self.translation = translation;
    }

    pub fn rotation_constraint(&self) -> AxisPlane {
        self.rotation
    }

    pub fn set_rotation_constraint(&mut self, rotation: AxisPlane) {
        self.rotation = rotation;
    }

    pub fn scaling_constraint(&self) -> ScalingConstraint {
        self.scaling
    }

    pub fn set_scaling_constraint(&mut self, values: impl Into<mint::Vector3<f64>>) {
        self.scaling = ScalingConstraint::new(values);
    }

    /// Expresses a translation direction in the reference frame of `frame`.
    fn translation_direction(&self, direction: DVec3, frame: &Frame) -> DVec3 {
        match &self.space {
            ConstraintSpace::World => frame.reference_transform_of(direction),
            ConstraintSpace::Local => frame.rotation() * direction,
            ConstraintSpace::Camera(camera) => {
                frame.reference_transform_of(camera_to_world(camera, direction, frame))
            }
        }
    }

    /// Expresses a rotation axis in the coordinates of `frame`.
    fn rotation_axis(&self, direction: DVec3, frame: &Frame) -> DVec3 {
        match &self.space {
            ConstraintSpace::World => frame.transform_of(direction),
            ConstraintSpace::Local => direction,
            ConstraintSpace::Camera(camera) => {
                frame.transform_of(camera_to_world(camera, direction, frame))
            }
        }
    }
}

/// A camera constraining its own frame is already mutably borrowed, in which case
/// `frame` is the camera.
fn camera_to_world(camera: &SharedFrame, direction: DVec3, frame: &Frame) -> DVec3 {
    match camera.try_borrow() {
        Ok(camera) => camera.inverse_transform_of(direction),
        Err(_) => frame.inverse_transform_of(direction),
    }
}

impl Constraint for AxisPlaneConstraint {
    fn constrain_translation(&self, translation: DVec3, frame: &Frame) -> DVec3 {
        match self.translation {
            AxisPlane::Free => translation,
            AxisPlane::Forbidden => DVec3::ZERO,
            AxisPlane::Axis(direction) => {
                project_on_axis(translation, self.translation_direction(direction, frame))
            }
            AxisPlane::Plane(normal) => {
                project_on_plane(translation, self.translation_direction(normal, frame))
            }
        }
    }

    fn constrain_rotation(&self, rotation: DQuat, frame: &Frame) -> DQuat {
        match self.rotation {
            AxisPlane::Free | AxisPlane::Plane(_) => rotation,
            AxisPlane::Forbidden => DQuat::IDENTITY,
            AxisPlane::Axis(direction) => {
                let axis = self.rotation_axis(direction, frame);
                let projected = project_on_axis(rotation.xyz(), axis);
                quat_from_axis_angle(projected, quat_angle(rotation))
            }
        }
    }

    fn constrain_scaling(&self, scaling: DVec3, _frame: &Frame) -> DVec3 {
        self.scaling.apply(scaling)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use proptest::prelude::*;

    use super::*;

    fn vec3() -> impl Strategy<Value = DVec3> {
        (-1e3..1e3f64, -1e3..1e3f64, -1e3..1e3f64).prop_map(|(x, y, z)| DVec3::new(x, y, z))
    }

    fn rotated_frame() -> Frame {
        let mut frame = Frame::new();
        frame.set_rotation(DQuat::from_rotation_z(FRAC_PI_2));
        frame
    }

    proptest! {
        #[test]
        fn forbidden_translation_is_always_zero(delta in vec3()) {
            let constraint = AxisPlaneConstraint::local().with_translation(AxisPlane::Forbidden);
            prop_assert_eq!(constraint.constrain_translation(delta, &rotated_frame()), DVec3::ZERO);
        }

        #[test]
        fn free_constraint_is_the_identity(delta in vec3(), angle in -3.0..3.0f64) {
            let frame = rotated_frame();
            let constraint = AxisPlaneConstraint::world();
            let rotation = DQuat::from_axis_angle(DVec3::new(1.0, 2.0, 3.0).normalize(), angle);
            prop_assert_eq!(constraint.constrain_translation(delta, &frame), delta);
            prop_assert_eq!(constraint.constrain_rotation(rotation, &frame), rotation);
        }
    }

    #[test]
    fn world_axis_keeps_only_the_axial_component() {
        let constraint = AxisPlaneConstraint::world().with_translation(AxisPlane::axis(DVec3::X));
        let filtered = constraint.constrain_translation(DVec3::new(1.0, 2.0, 3.0), &Frame::new());
        assert!(filtered.abs_diff_eq(DVec3::new(1.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn world_plane_removes_the_normal_component() {
        let constraint = AxisPlaneConstraint::world().with_translation(AxisPlane::plane(DVec3::Z));
        let filtered = constraint.constrain_translation(DVec3::new(1.0, 2.0, 3.0), &Frame::new());
        assert!(filtered.abs_diff_eq(DVec3::new(1.0, 2.0, 0.0), 1e-12));
    }

    #[test]
    fn world_axis_is_expressed_in_the_parent_frame() {
        let mut parent = Frame::new();
        parent.set_rotation(DQuat::from_rotation_z(FRAC_PI_2));
        let child = Frame::new().with_reference_frame(parent.shared());

        // World X is the parent's -Y axis.
        let constraint = AxisPlaneConstraint::world().with_translation(AxisPlane::axis(DVec3::X));
        let filtered = constraint.constrain_translation(DVec3::new(4.0, -2.0, 1.0), &child);
        assert!(filtered.abs_diff_eq(DVec3::new(0.0, -2.0, 0.0), 1e-12));
    }

    #[test]
    fn local_axis_follows_the_frame_orientation() {
        // Local X of a frame rotated a quarter turn around Z is the reference Y axis.
        let constraint = AxisPlaneConstraint::local().with_translation(AxisPlane::axis(DVec3::X));
        let filtered = constraint.constrain_translation(DVec3::new(1.0, 2.0, 3.0), &rotated_frame());
        assert!(filtered.abs_diff_eq(DVec3::new(0.0, 2.0, 0.0), 1e-12));
    }

    #[test]
    fn camera_axis_is_converted_from_camera_space() {
        let mut camera = Frame::new();
        camera.set_rotation(DQuat::from_rotation_y(FRAC_PI_2));
        let camera = camera.shared();

        // Camera Z is world X after a quarter turn around Y.
        let constraint =
            AxisPlaneConstraint::camera(camera).with_translation(AxisPlane::axis(DVec3::Z));
        let filtered = constraint.constrain_translation(DVec3::new(5.0, 6.0, 7.0), &Frame::new());
        assert!(filtered.abs_diff_eq(DVec3::new(5.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn local_plane_follows_the_frame_orientation() {
        // The local X normal of a frame turned a quarter around Z is the reference Y axis.
        let constraint = AxisPlaneConstraint::local().with_translation(AxisPlane::plane(DVec3::X));
        let filtered = constraint.constrain_translation(DVec3::new(1.0, 2.0, 3.0), &rotated_frame());
        assert!(filtered.abs_diff_eq(DVec3::new(1.0, 0.0, 3.0), 1e-12));
    }

    #[test]
    fn camera_plane_is_expressed_in_the_parent_frame() {
        let mut camera = Frame::new();
        camera.set_rotation(DQuat::from_rotation_y(FRAC_PI_2));
        let child = Frame::new().with_reference_frame(rotated_frame().shared());

        // Camera Z is world X, which is the parent's -Y axis.
        let constraint = AxisPlaneConstraint::camera(camera.shared())
            .with_translation(AxisPlane::plane(DVec3::Z));
        let filtered = constraint.constrain_translation(DVec3::new(5.0, 6.0, 7.0), &child);
        assert!(filtered.abs_diff_eq(DVec3::new(5.0, 0.0, 7.0), 1e-12));
    }

    #[test]
    fn camera_rotation_axis_is_expressed_in_the_frame() {
        let mut camera = Frame::new();
        camera.set_rotation(DQuat::from_rotation_z(FRAC_PI_2));
        let mut frame = Frame::new();
        frame.set_rotation(DQuat::from_rotation_x(FRAC_PI_2));

        // Camera X is world Y, which is the frame -Z axis.
        let constraint =
            AxisPlaneConstraint::camera(camera.shared()).with_rotation(AxisPlane::axis(DVec3::X));
        let rotation = DQuat::from_axis_angle(DVec3::new(1.0, 0.0, -1.0).normalize(), 0.6);

        let filtered = constraint.constrain_rotation(rotation, &frame);
        assert!(filtered.abs_diff_eq(DQuat::from_axis_angle(DVec3::NEG_Z, 0.6), 1e-9));
    }

    #[test]
    fn camera_constraint_on_the_camera_itself() {
        let camera = Frame::new().shared();
        camera.borrow_mut().set_rotation(DQuat::from_rotation_y(FRAC_PI_2));
        let constraint =
            AxisPlaneConstraint::camera(camera.clone()).with_translation(AxisPlane::axis(DVec3::Z));
        camera.borrow_mut().set_constraint(constraint);

        camera.borrow_mut().translate(DVec3::new(5.0, 6.0, 7.0));
        assert!(camera.borrow().translation().abs_diff_eq(DVec3::new(5.0, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn rotation_axis_constraint_keeps_the_angle() {
        let constraint = AxisPlaneConstraint::local().with_rotation(AxisPlane::axis(DVec3::Z));
        let rotation = DQuat::from_axis_angle(DVec3::new(1.0, 0.0, 1.0).normalize(), 0.8);

        let filtered = constraint.constrain_rotation(rotation, &Frame::new());
        let (axis, angle) = filtered.to_axis_angle();
        assert!(axis.abs_diff_eq(DVec3::Z, 1e-9));
        assert!((angle - 0.8).abs() < 1e-9);
    }

    #[test]
    fn world_rotation_axis_is_expressed_in_the_frame() {
        // World Y is the frame X axis after a quarter turn around Z.
        let constraint = AxisPlaneConstraint::world().with_rotation(AxisPlane::axis(DVec3::Y));
        let rotation = DQuat::from_axis_angle(DVec3::new(-1.0, 1.0, 0.0).normalize(), 0.4);

        let filtered = constraint.constrain_rotation(rotation, &rotated_frame());
        let (axis, angle) = filtered.to_axis_angle();
        assert!(axis.abs_diff_eq(DVec3::NEG_X, 1e-9));
        assert!((angle - 0.4).abs() < 1e-9);
    }

    #[test]
    fn forbidden_rotation_is_the_identity_and_plane_is_free() {
        let rotation = DQuat::from_rotation_x(0.3);
        let forbidden = AxisPlaneConstraint::world().with_rotation(AxisPlane::Forbidden);
        let plane = AxisPlaneConstraint::world().with_rotation(AxisPlane::plane(DVec3::Z));

        assert_eq!(forbidden.constrain_rotation(rotation, &Frame::new()), DQuat::IDENTITY);
        assert_eq!(plane.constrain_rotation(rotation, &Frame::new()), rotation);
    }

    #[test]
    fn null_direction_falls_back_to_free() {
        assert_eq!(AxisPlane::axis(DVec3::ZERO), AxisPlane::Free);
        assert_eq!(AxisPlane::plane(DVec3::splat(1e-9)), AxisPlane::Free);
        assert_eq!(AxisPlane::axis(DVec3::new(0.0, 3.0, 0.0)).direction(), Some(DVec3::Y));
    }

    #[test]
    fn scaling_couples_to_the_driving_axis() {
        let scaling = ScalingConstraint::new(DVec3::new(1.0, 0.5, 0.0));
        assert_eq!(scaling.driving_axis(), Some(0));
        assert_eq!(scaling.apply(DVec3::new(2.0, 7.0, 3.0)), DVec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn scaling_without_driving_axis_is_independent() {
        let scaling = ScalingConstraint::new(DVec3::new(0.0, 2.0, 3.0));
        assert_eq!(scaling.driving_axis(), None);
        assert_eq!(scaling.apply(DVec3::new(4.0, 5.0, 6.0)), DVec3::new(1.0, 5.0, 6.0));
    }

    #[test]
    fn default_scaling_is_free() {
        let scaling = ScalingConstraint::default();
        assert_eq!(scaling.driving_axis(), None);
        assert_eq!(scaling.apply(DVec3::new(4.0, 5.0, 6.0)), DVec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn zero_scaling_input_is_a_no_op() {
        let scaling = ScalingConstraint::new(DVec3::new(2.0, 1.0, 3.0));
        // Y drives, its zero input is replaced by one before coupling.
        assert_eq!(scaling.apply(DVec3::new(5.0, 0.0, 5.0)), DVec3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn frame_scale_goes_through_the_constraint() {
        let mut frame = Frame::new()
            .with_constraint(AxisPlaneConstraint::world().with_scaling(DVec3::new(1.0, 0.5, 0.0)));
        frame.scale(DVec3::new(2.0, 7.0, 3.0));
        assert_eq!(frame.scaling(), DVec3::new(2.0, 1.0, 1.0));
    }
}
