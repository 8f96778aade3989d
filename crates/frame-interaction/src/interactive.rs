use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::action::{Actionable, GlobalAction};
use crate::agent::Grabbable;
use crate::config::InteractionConfig;
use crate::event::{Event, InputEvent};
use crate::frame::{Frame, SharedFrame};
use crate::math::{quat_angle, quat_from_axis_angle, DQuat, DVec2, DVec3, EPSILON};
use crate::timer::{FrameClock, JobId, TimerPool};

/// A [`Frame`] that can be grabbed by an [`Agent`](crate::agent::Agent) and
/// manipulated by the actions attached to the events it receives.
///
/// Screen-space motions are interpreted relative to the camera frame, when
/// one is set, and to the world axes otherwise. The host keeps the projected
/// position of the frame up to date with [`InteractiveFrame::set_screen_position`]
/// so the frame can tell whether the pointer is close enough to grab it.
#[derive(Debug)]
pub struct InteractiveFrame {
    frame: Frame,
    config: InteractionConfig,
    camera: Option<SharedFrame>,
    screen_position: Option<DVec2>,
    grabs_input: bool,
    spinning: Option<DQuat>,
    last_rotation: DQuat,
}

impl InteractiveFrame {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            config: InteractionConfig::default(),
            camera: None,
            screen_position: None,
            grabs_input: false,
            spinning: None,
            last_rotation: DQuat::IDENTITY,
        }
    }

    pub fn with_config(mut self, config: InteractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_camera(mut self, camera: SharedFrame) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut InteractionConfig {
        &mut self.config
    }

    pub fn camera(&self) -> Option<&SharedFrame> {
        self.camera.as_ref()
    }

    pub fn set_camera(&mut self, camera: Option<SharedFrame>) {
        self.camera = camera;
    }

    /// Projected position of the frame origin, in pixels.
    pub fn screen_position(&self) -> Option<DVec2> {
        self.screen_position
    }

    pub fn set_screen_position(&mut self, position: impl Into<mint::Vector2<f64>>) {
        let position: mint::Vector2<f64> = position.into();
        self.screen_position = Some(position.into());
    }

    /// Forgets the screen position, e.g. when the frame is out of view.
    pub fn clear_screen_position(&mut self) {
        self.screen_position = None;
    }

    /// The incremental rotation applied by the latest rotating action.
    pub fn last_rotation(&self) -> DQuat {
        self.last_rotation
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning.is_some()
    }

    /// Starts rotating the frame by `rotation`, in frame coordinates, at every [`InteractiveFrame::spin`].
    pub fn start_spinning(&mut self, rotation: impl Into<mint::Quaternion<f64>>) {
        let rotation: mint::Quaternion<f64> = rotation.into();
        let rotation = DQuat::from(rotation).normalize();
        self.spinning = (quat_angle(rotation) > EPSILON).then_some(rotation);
    }

    pub fn stop_spinning(&mut self) {
        self.spinning = None;
    }

    /// Applies one spin step and damps the spinning rotation.
    ///
    /// Spinning stops once the rotation becomes negligible.
    pub fn spin(&mut self) {
        let Some(rotation) = self.spinning else {
            return;
        };
        self.frame.rotate(rotation);

        let angle = quat_angle(rotation) * (1.0 - self.config.spinning_damping.clamp(0.0, 1.0));
        self.spinning = (angle > EPSILON).then(|| {
            let axis = DVec3::new(rotation.x, rotation.y, rotation.z);
            quat_from_axis_angle(axis, angle)
        });
    }

    /// Registers a job spinning `this` every `period` milliseconds.
    ///
    /// The job holds a weak reference and does nothing once the frame is
    /// dropped, but it stays registered and keeps firing: the owner must
    /// remove it with [`TimerPool::unregister_job`] (or stop it) when the
    /// frame goes away.
    pub fn spin_with_timer<K, C>(
        this: &Rc<RefCell<Self>>,
        pool: &mut TimerPool<K, C>,
        owner: K,
        period: u64,
    ) -> JobId
    where
        K: Eq + Hash + std::fmt::Debug,
        C: FrameClock,
    {
        let frame: Weak<RefCell<Self>> = Rc::downgrade(this);
        pool.schedule(owner, period, move || {
            if let Some(frame) = frame.upgrade() {
                frame.borrow_mut().spin();
            }
        })
    }

    /// Aligns the frame axes with its reference frame.
    pub fn align(&mut self) {
        self.frame.set_rotation(DQuat::IDENTITY);
    }

    /// Moves the frame back to the origin of its reference frame.
    pub fn center(&mut self) {
        self.frame.set_translation(DVec3::ZERO);
    }

    /// Converts a camera vector into the reference frame of the frame.
    fn camera_to_reference(&self, vector: DVec3) -> DVec3 {
        let world = match &self.camera {
            Some(camera) => camera.borrow().inverse_transform_of(vector),
            None => vector,
        };
        self.frame.reference_transform_of(world)
    }

    /// Converts a camera vector into the frame coordinates, ignoring scaling.
    fn camera_to_local_axis(&self, axis: DVec3) -> DVec3 {
        let world = match &self.camera {
            Some(camera) => camera.borrow().orientation() * axis,
            None => axis,
        };
        self.frame.orientation().inverse() * world
    }

    fn translate_in_camera(&mut self, motion: DVec3) {
        let translation = self.camera_to_reference(motion * self.config.translation_sensitivity);
        self.frame.translate(translation);
    }

    fn rotate_in_camera(&mut self, axis: DVec3, angle: f64) {
        let rotation = quat_from_axis_angle(self.camera_to_local_axis(axis), angle);
        self.rotate_local(rotation);
    }

    fn rotate_local(&mut self, rotation: DQuat) {
        self.last_rotation = rotation;
        self.frame.rotate(rotation);
    }

    fn translate_along(&mut self, axis: DVec3, amount: f64) {
        let translation = self.frame.rotation() * axis * amount * self.config.translation_sensitivity;
        self.frame.translate(translation);
    }

    fn scale_by(&mut self, amount: f64) {
        let factor = 1.0 + amount * self.config.scaling_sensitivity;
        if factor > EPSILON {
            self.frame.scale(DVec3::splat(factor));
        }
    }

    /// Pointer motion `(dx, dy)` in screen coordinates (Y down) mapped to a
    /// camera vector.
    fn screen_to_camera(motion: DVec2) -> DVec3 {
        DVec3::new(motion.x, -motion.y, 0.0)
    }

    fn rotate_from_pointer(&mut self, motion: DVec2) {
        let angle = motion.length() * self.config.rotation_sensitivity;
        self.rotate_in_camera(DVec3::new(motion.y, motion.x, 0.0), angle);
    }

    /// Rotates around the camera view axis by the angle the pointer swept
    /// around the frame screen position.
    fn screen_rotate(&mut self, event: &Event) {
        let angle = match (event, self.screen_position) {
            (Event::Dof2(e), Some(center)) if e.is_relative() => {
                let current = DVec2::new(e.x(), e.y()) - center;
                let previous = e
                    .previous_coordinates()
                    .map_or(current, |[x, y]| DVec2::new(x, y) - center);
                if current.length_squared() < EPSILON || previous.length_squared() < EPSILON {
                    return;
                }
                // Screen Y points down, so a clockwise sweep is a negative rotation.
                -previous.angle_to(current)
            }
            _ => match planar_motion(event) {
                Some(motion) => motion.x * self.config.rotation_sensitivity,
                None => return,
            },
        };
        self.rotate_in_camera(DVec3::Z, angle);
    }

    fn perform(&mut self, action: GlobalAction, event: &Event) {
        match action {
            GlobalAction::AlignFrame => self.align(),
            GlobalAction::CenterFrame => self.center(),
            // Handled by the agent.
            GlobalAction::Select | GlobalAction::Deselect => {}
            GlobalAction::TranslateX | GlobalAction::TranslateY | GlobalAction::TranslateZ => {
                let Some(amount) = self.axis_motion(event, action) else {
                    return;
                };
                let axis = match action {
                    GlobalAction::TranslateX => DVec3::X,
                    GlobalAction::TranslateY => DVec3::Y,
                    _ => DVec3::Z,
                };
                self.translate_along(axis, amount);
            }
            GlobalAction::RotateX | GlobalAction::RotateY | GlobalAction::RotateZ => {
                let Some(amount) = self.axis_motion(event, action) else {
                    return;
                };
                let angle = amount * self.config.rotation_sensitivity;
                let rotation = match action {
                    GlobalAction::RotateX => DQuat::from_rotation_x(angle),
                    GlobalAction::RotateY => DQuat::from_rotation_y(angle),
                    _ => DQuat::from_rotation_z(angle),
                };
                self.rotate_local(rotation);
            }
            GlobalAction::Scale => {
                if let Some(amount) = self.axis_motion(event, action) {
                    self.scale_by(amount);
                }
            }
            GlobalAction::Translate => {
                if let Some(motion) = planar_motion(event) {
                    self.translate_in_camera(Self::screen_to_camera(motion));
                }
            }
            GlobalAction::ScreenTranslate => {
                if let Some(motion) = planar_motion(event) {
                    // Only the dominant screen direction is kept.
                    let motion = if motion.x.abs() >= motion.y.abs() {
                        DVec2::new(motion.x, 0.0)
                    } else {
                        DVec2::new(0.0, motion.y)
                    };
                    self.translate_in_camera(Self::screen_to_camera(motion));
                }
            }
            GlobalAction::Rotate if self.config.two_dimensional => self.screen_rotate(event),
            GlobalAction::Rotate => {
                if let Some(motion) = planar_motion(event) {
                    self.rotate_from_pointer(motion);
                }
            }
            GlobalAction::ScreenRotate => self.screen_rotate(event),
            GlobalAction::TranslateXYZ => {
                if let Some(motion) = spatial_motion(event, true) {
                    self.translate_in_camera(motion);
                }
            }
            GlobalAction::RotateXYZ => {
                if let Some(motion) = spatial_motion(event, false) {
                    self.rotate_in_camera(motion, motion.length() * self.config.rotation_sensitivity);
                }
            }
            GlobalAction::TranslateXYZRotateXYZ => {
                if let Some(motion) = spatial_motion(event, true) {
                    self.translate_in_camera(motion);
                }
                if let Some(motion) = spatial_motion(event, false) {
                    self.rotate_in_camera(motion, motion.length() * self.config.rotation_sensitivity);
                }
            }
        }
    }

    /// Motion driving a single axis action, demoting the event as needed.
    ///
    /// Pointers drive X actions with their X channel and every other action
    /// with their Y channel.
    fn axis_motion(&self, event: &Event, action: GlobalAction) -> Option<f64> {
        let axis = match action {
            GlobalAction::TranslateX | GlobalAction::RotateX => 0,
            GlobalAction::TranslateY | GlobalAction::RotateY => 1,
            _ => 2,
        };
        let rotation = matches!(
            action,
            GlobalAction::RotateX | GlobalAction::RotateY | GlobalAction::RotateZ
        );
        match event {
            Event::Dof1(e) => Some(e.motion()[0] * self.config.wheel_sensitivity),
            Event::Dof2(e) => Some(e.dof1_event(axis == 0).motion()[0]),
            Event::Dof3(e) => Some(e.motion()[axis]),
            Event::Dof6(e) => Some(e.dof3_event(!rotation).motion()[axis]),
            Event::Click(_) | Event::Keyboard(_) => None,
        }
    }
}

fn planar_motion(event: &Event) -> Option<DVec2> {
    let [x, y] = match event {
        Event::Dof2(e) => e.motion(),
        Event::Dof3(e) => e.dof2_event().motion(),
        Event::Dof6(e) => e.dof3_event(true).dof2_event().motion(),
        _ => return None,
    };
    Some(DVec2::new(x, y))
}

fn spatial_motion(event: &Event, translation: bool) -> Option<DVec3> {
    let motion = match event {
        Event::Dof3(e) => e.motion(),
        Event::Dof6(e) => e.dof3_event(translation).motion(),
        _ => return None,
    };
    Some(DVec3::from_array(motion))
}

impl Grabbable for InteractiveFrame {
    /// Pointer events grab the frame when they are within the grab threshold
    /// of its screen position. A drag keeps grabbing the frame it started on.
    /// Other events keep the latest verdict.
    fn check_if_grabs_input(&mut self, event: &Event) {
        let Event::Dof2(e) = event else {
            return;
        };
        let Some(position) = self.screen_position else {
            self.grabs_input = false;
            return;
        };
        let dragging = self.grabs_input && e.button().is_some();
        let distance = (DVec2::new(e.x(), e.y()) - position).abs();
        self.grabs_input = dragging || distance.max_element() < self.config.grabs_input_threshold;
    }

    fn grabs_input(&self) -> bool {
        self.grabs_input
    }

    fn perform_interaction(&mut self, event: &Event) {
        let Some(action) = event.action() else {
            return;
        };
        let global = action.global();
        if self.config.two_dimensional && !global.is_2d() {
            trace!(action = %global, "ignoring 3D action in a 2D scene");
            return;
        }
        self.perform(global, event);
    }
}
