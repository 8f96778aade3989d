use std::cell::RefCell;
use std::rc::Rc;

use crate::constraint::Constraint;
use crate::math::{DQuat, DVec3, Transform};

/// A frame shared between its children, interactive wrappers and camera-relative constraints.
pub type SharedFrame = Rc<RefCell<Frame>>;

/// A coordinate system defined by a translation, a rotation and a per-axis scaling,
/// expressed relative to an optional reference (parent) frame.
///
/// [`Frame::translate`], [`Frame::rotate`] and [`Frame::scale`] filter their input
/// through the frame's [`Constraint`], if any. The `set_*` methods bypass it.
#[derive(Debug)]
pub struct Frame {
    translation: DVec3,
    rotation: DQuat,
    scaling: DVec3,
    reference: Option<SharedFrame>,
    constraint: Option<Box<dyn Constraint>>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Creates a frame at the world origin, with no rotation and unit scaling.
    pub fn new() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scaling: DVec3::ONE,
            reference: None,
            constraint: None,
        }
    }

    pub fn from_transform(transform: Transform) -> Self {
        let mut frame = Self::new();
        frame.set_transform(transform);
        frame
    }

    pub fn with_reference_frame(mut self, reference: SharedFrame) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_constraint(mut self, constraint: impl Constraint + 'static) -> Self {
        self.constraint = Some(Box::new(constraint));
        self
    }

    /// Wraps the frame so it can be used as a reference frame or a camera.
    pub fn shared(self) -> SharedFrame {
        Rc::new(RefCell::new(self))
    }

    /// Translation relative to the reference frame.
    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: impl Into<mint::Vector3<f64>>) {
        let translation: mint::Vector3<f64> = translation.into();
        self.translation = translation.into();
    }

    /// Rotation relative to the reference frame.
    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: impl Into<mint::Quaternion<f64>>) {
        let rotation: mint::Quaternion<f64> = rotation.into();
        self.rotation = DQuat::from(rotation).normalize();
    }

    pub fn scaling(&self) -> DVec3 {
        self.scaling
    }

    pub fn set_scaling(&mut self, scaling: impl Into<mint::Vector3<f64>>) {
        let scaling: mint::Vector3<f64> = scaling.into();
        self.scaling = scaling.into();
    }

    pub fn transform(&self) -> Transform {
        Transform::from_scale_rotation_translation(self.scaling, self.rotation, self.translation)
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.set_scaling(transform.scale);
        self.set_rotation(transform.rotation);
        self.set_translation(transform.translation);
    }

    pub fn reference_frame(&self) -> Option<&SharedFrame> {
        self.reference.as_ref()
    }

    pub fn set_reference_frame(&mut self, reference: Option<SharedFrame>) {
        self.reference = reference;
    }

    pub fn constraint(&self) -> Option<&dyn Constraint> {
        self.constraint.as_deref()
    }

    pub fn set_constraint(&mut self, constraint: impl Constraint + 'static) {
        self.constraint = Some(Box::new(constraint));
    }

    pub fn clear_constraint(&mut self) -> Option<Box<dyn Constraint>> {
        self.constraint.take()
    }

    /// Translates the frame by `translation`, expressed in the reference frame.
    pub fn translate(&mut self, translation: impl Into<mint::Vector3<f64>>) {
        let translation: mint::Vector3<f64> = translation.into();
        let mut translation = DVec3::from(translation);
        if let Some(constraint) = &self.constraint {
            translation = constraint.constrain_translation(translation, self);
        }
        self.translation += translation;
    }

    /// Rotates the frame by `rotation`, expressed in the frame's own coordinates.
    pub fn rotate(&mut self, rotation: impl Into<mint::Quaternion<f64>>) {
        let rotation: mint::Quaternion<f64> = rotation.into();
        let mut rotation = DQuat::from(rotation);
        if let Some(constraint) = &self.constraint {
            rotation = constraint.constrain_rotation(rotation, self);
        }
        self.rotation = (self.rotation * rotation).normalize();
    }

    /// Multiplies the frame scaling by `scaling`, component-wise.
    pub fn scale(&mut self, scaling: impl Into<mint::Vector3<f64>>) {
        let scaling: mint::Vector3<f64> = scaling.into();
        let mut scaling = DVec3::from(scaling);
        if let Some(constraint) = &self.constraint {
            scaling = constraint.constrain_scaling(scaling, self);
        }
        self.scaling *= scaling;
    }

    /// World position of the frame origin.
    pub fn position(&self) -> DVec3 {
        self.inverse_coordinates_of(DVec3::ZERO)
    }

    /// World orientation of the frame, ignoring scaling.
    pub fn orientation(&self) -> DQuat {
        match &self.reference {
            Some(reference) => reference.borrow().orientation() * self.rotation,
            None => self.rotation,
        }
    }

    /// Converts a vector from the reference frame into this frame.
    pub fn local_transform_of(&self, vector: DVec3) -> DVec3 {
        self.rotation.inverse() * vector / self.scaling
    }

    /// Converts a vector from this frame into the reference frame.
    pub fn local_inverse_transform_of(&self, vector: DVec3) -> DVec3 {
        self.rotation * (vector * self.scaling)
    }

    /// Converts a world vector into this frame.
    pub fn transform_of(&self, vector: DVec3) -> DVec3 {
        self.local_transform_of(self.reference_transform_of(vector))
    }

    /// Converts a vector of this frame into world coordinates.
    pub fn inverse_transform_of(&self, vector: DVec3) -> DVec3 {
        self.reference_inverse_transform_of(self.local_inverse_transform_of(vector))
    }

    /// Converts a world vector into the reference frame. Identity without a reference frame.
    pub fn reference_transform_of(&self, vector: DVec3) -> DVec3 {
        match &self.reference {
            Some(reference) => reference.borrow().transform_of(vector),
            None => vector,
        }
    }

    /// Converts a vector of the reference frame into world coordinates.
    pub fn reference_inverse_transform_of(&self, vector: DVec3) -> DVec3 {
        match &self.reference {
            Some(reference) => reference.borrow().inverse_transform_of(vector),
            None => vector,
        }
    }

    pub fn local_coordinates_of(&self, point: DVec3) -> DVec3 {
        self.rotation.inverse() * (point - self.translation) / self.scaling
    }

    pub fn local_inverse_coordinates_of(&self, point: DVec3) -> DVec3 {
        self.rotation * (point * self.scaling) + self.translation
    }

    /// Converts a world point into this frame.
    pub fn coordinates_of(&self, point: DVec3) -> DVec3 {
        let point = match &self.reference {
            Some(reference) => reference.borrow().coordinates_of(point),
            None => point,
        };
        self.local_coordinates_of(point)
    }

    /// Converts a point of this frame into world coordinates.
    pub fn inverse_coordinates_of(&self, point: DVec3) -> DVec3 {
        let point = self.local_inverse_coordinates_of(point);
        match &self.reference {
            Some(reference) => reference.borrow().inverse_coordinates_of(point),
            None => point,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn vectors_round_trip_through_a_hierarchy() {
        let mut parent = Frame::new();
        parent.set_rotation(DQuat::from_rotation_z(FRAC_PI_2));
        parent.set_scaling(DVec3::new(2.0, 2.0, 2.0));
        let child = Frame::new().with_reference_frame(parent.shared());

        let world = DVec3::new(1.0, 2.0, 3.0);
        let local = child.transform_of(world);
        assert!(child.inverse_transform_of(local).abs_diff_eq(world, 1e-12));
    }

    #[test]
    fn transform_of_undoes_parent_rotation() {
        let mut parent = Frame::new();
        parent.set_rotation(DQuat::from_rotation_z(FRAC_PI_2));
        let child = Frame::new().with_reference_frame(parent.shared());

        assert!(child.transform_of(DVec3::Y).abs_diff_eq(DVec3::X, 1e-12));
    }

    #[test]
    fn position_accounts_for_reference_frames() {
        let mut parent = Frame::new();
        parent.set_translation(DVec3::new(1.0, 0.0, 0.0));
        let mut child = Frame::new().with_reference_frame(parent.shared());
        child.set_translation(DVec3::new(0.0, 2.0, 0.0));

        assert!(child.position().abs_diff_eq(DVec3::new(1.0, 2.0, 0.0), 1e-12));
        assert!(child.coordinates_of(child.position()).abs_diff_eq(DVec3::ZERO, 1e-12));
    }

    #[test]
    fn unconstrained_operations_accumulate() {
        let mut frame = Frame::new();
        frame.translate(DVec3::X);
        frame.translate(DVec3::Y);
        frame.scale(DVec3::new(2.0, 3.0, 4.0));
        frame.rotate(DQuat::from_rotation_x(0.5));

        assert_eq!(frame.translation(), DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(frame.scaling(), DVec3::new(2.0, 3.0, 4.0));
        assert!(frame.rotation().abs_diff_eq(DQuat::from_rotation_x(0.5), 1e-12));
    }

    #[test]
    fn transform_interop() {
        let transform = Transform::from_scale_rotation_translation(
            DVec3::splat(2.0),
            DQuat::from_rotation_y(0.3),
            DVec3::new(4.0, 5.0, 6.0),
        );
        let frame = Frame::from_transform(transform);
        assert_eq!(DVec3::from(frame.transform().translation), DVec3::new(4.0, 5.0, 6.0));
        assert_eq!(frame.scaling(), DVec3::splat(2.0));
    }
}
