//! Input events, typed by the number of degrees of freedom they carry.
//!
//! Motion events are [`MotionEvent<D>`] values where `D` is one of the
//! [`Dof1`], [`Dof2`], [`Dof3`] or [`Dof6`] markers. A motion event is
//! *relative* when it keeps a copy of the previous sample of the same device,
//! from which [`MotionEvent::delta`] is computed, and *absolute* otherwise.
//!
//! Higher arity events can be demoted to lower arity ones, e.g.
//! [`Dof2Event::dof1_event`] extracts the X or Y channel of a pointer event.
//! Demotion is only available on the arities carrying the requested channels.

use std::fmt;

use enum_dispatch::enum_dispatch;

use crate::action::{
    Action, ClickAction, Dof1Action, Dof2Action, Dof3Action, Dof6Action, KeyboardAction,
};
use crate::error::EventError;
use crate::math::EPSILON;
use crate::shortcut::{
    Button, ButtonShortcut, ClickShortcut, Key, KeyboardShortcut, Modifiers, Shortcut,
};

/// Family of an event or of an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Keyboard,
    Dof1,
    Dof2,
    Dof3,
    Dof6,
}

impl EventKind {
    /// Number of coordinates carried by events of this kind.
    pub const fn dofs(self) -> usize {
        match self {
            Self::Click | Self::Keyboard => 0,
            Self::Dof1 => 1,
            Self::Dof2 => 2,
            Self::Dof3 => 3,
            Self::Dof6 => 6,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click => f.write_str("click"),
            Self::Keyboard => f.write_str("keyboard"),
            dof => write!(f, "{}-DOF", dof.dofs()),
        }
    }
}

/// Arity of a motion event.
pub trait Dof: fmt::Debug + Copy + Default + PartialEq + 'static {
    const DOFS: usize;
    const KIND: EventKind;

    /// Fixed size coordinate array, `[f64; DOFS]`.
    type Coords: fmt::Debug + Copy + Default + PartialEq + AsRef<[f64]> + AsMut<[f64]>;
    /// Actions events of this arity can carry.
    type Action: fmt::Debug + Copy + PartialEq + Into<Action>;

    /// Converts `action` to this arity, promoting lower arity actions.
    fn action_from(action: Action) -> Option<Self::Action>;
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Dof1;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Dof2;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Dof3;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Dof6;

impl Dof for Dof1 {
    const DOFS: usize = 1;
    const KIND: EventKind = EventKind::Dof1;
    type Coords = [f64; 1];
    type Action = Dof1Action;

    fn action_from(action: Action) -> Option<Self::Action> {
        match action {
            Action::Dof1(action) => Some(action),
            _ => None,
        }
    }
}

impl Dof for Dof2 {
    const DOFS: usize = 2;
    const KIND: EventKind = EventKind::Dof2;
    type Coords = [f64; 2];
    type Action = Dof2Action;

    fn action_from(action: Action) -> Option<Self::Action> {
        match action {
            Action::Dof1(action) => Some(action.into()),
            Action::Dof2(action) => Some(action),
            _ => None,
        }
    }
}

impl Dof for Dof3 {
    const DOFS: usize = 3;
    const KIND: EventKind = EventKind::Dof3;
    type Coords = [f64; 3];
    type Action = Dof3Action;

    fn action_from(action: Action) -> Option<Self::Action> {
        match action {
            Action::Dof1(action) => Some(action.into()),
            Action::Dof2(action) => Some(action.into()),
            Action::Dof3(action) => Some(action),
            _ => None,
        }
    }
}

impl Dof for Dof6 {
    const DOFS: usize = 6;
    const KIND: EventKind = EventKind::Dof6;
    type Coords = [f64; 6];
    type Action = Dof6Action;

    fn action_from(action: Action) -> Option<Self::Action> {
        match action {
            Action::Dof1(action) => Some(action.into()),
            Action::Dof2(action) => Some(action.into()),
            Action::Dof3(action) => Some(action.into()),
            Action::Dof6(action) => Some(action),
            _ => None,
        }
    }
}

/// Copy of the sample preceding a relative motion event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample<D: Dof> {
    pub timestamp: u64,
    pub coordinates: D::Coords,
}

/// A motion event with `D::DOFS` coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionEvent<D: Dof> {
    timestamp: u64,
    modifiers: Modifiers,
    button: Option<Button>,
    coordinates: D::Coords,
    previous: Option<Sample<D>>,
    action: Option<D::Action>,
}

/// A wheel-like event.
pub type Dof1Event = MotionEvent<Dof1>;
/// A pointer event.
pub type Dof2Event = MotionEvent<Dof2>;
pub type Dof3Event = MotionEvent<Dof3>;
/// A space navigator event: translation `(x, y, z)` then rotation `(rx, ry, rz)`.
pub type Dof6Event = MotionEvent<Dof6>;

impl<D: Dof> MotionEvent<D> {
    /// Creates an absolute event.
    pub fn new(
        modifiers: impl Into<Modifiers>,
        button: Option<Button>,
        coordinates: D::Coords,
    ) -> Self {
        Self {
            timestamp: 0,
            modifiers: modifiers.into(),
            button,
            coordinates,
            previous: None,
            action: None,
        }
    }

    /// Creates an event relative to `previous`.
    pub fn relative(
        previous: &Self,
        modifiers: impl Into<Modifiers>,
        button: Option<Button>,
        coordinates: D::Coords,
    ) -> Self {
        Self::new(modifiers, button, coordinates).with_previous(previous)
    }

    /// The sample following this one on the same device, with the same
    /// modifiers and button held.
    pub fn next(&self, coordinates: D::Coords) -> Self {
        Self::relative(self, self.modifiers, self.button, coordinates)
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_previous(mut self, previous: &Self) -> Self {
        self.previous = Some(Sample {
            timestamp: previous.timestamp,
            coordinates: previous.coordinates,
        });
        self
    }

    pub fn with_action(mut self, action: impl Into<D::Action>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn button(&self) -> Option<Button> {
        self.button
    }

    pub fn coordinates(&self) -> D::Coords {
        self.coordinates
    }

    pub fn previous(&self) -> Option<&Sample<D>> {
        self.previous.as_ref()
    }

    pub fn previous_coordinates(&self) -> Option<D::Coords> {
        self.previous.map(|previous| previous.coordinates)
    }

    pub fn is_relative(&self) -> bool {
        self.previous.is_some()
    }

    pub fn is_absolute(&self) -> bool {
        !self.is_relative()
    }

    /// Difference with the previous sample. Zero for absolute events.
    pub fn delta(&self) -> D::Coords {
        let mut delta = D::Coords::default();
        if let Some(previous) = &self.previous {
            for ((delta, current), previous) in delta
                .as_mut()
                .iter_mut()
                .zip(self.coordinates.as_ref())
                .zip(previous.coordinates.as_ref())
            {
                *delta = current - previous;
            }
        }
        delta
    }

    /// The motion to apply: the delta of relative events, the coordinates of absolute ones.
    pub fn motion(&self) -> D::Coords {
        if self.is_relative() {
            self.delta()
        } else {
            self.coordinates
        }
    }

    /// Milliseconds elapsed since the previous sample.
    pub fn delay(&self) -> u64 {
        self.previous
            .map_or(0, |previous| self.timestamp.saturating_sub(previous.timestamp))
    }

    /// Length of the delta per millisecond.
    pub fn speed(&self) -> f64 {
        let delay = self.delay();
        if delay == 0 {
            return 0.0;
        }
        let delta = self.delta();
        delta.as_ref().iter().map(|d| d * d).sum::<f64>().sqrt() / delay as f64
    }

    /// The attached action, in this event's arity.
    pub fn dof_action(&self) -> Option<D::Action> {
        self.action
    }

    pub fn set_action(&mut self, action: Option<D::Action>) {
        self.action = action;
    }

    pub fn button_shortcut(&self) -> ButtonShortcut {
        ButtonShortcut::new(self.modifiers, self.button)
    }

    fn demote<T: Dof>(
        &self,
        pick: impl Fn(&D::Coords) -> T::Coords,
        action: Option<T::Action>,
    ) -> MotionEvent<T> {
        MotionEvent {
            timestamp: self.timestamp,
            modifiers: self.modifiers,
            button: self.button,
            coordinates: pick(&self.coordinates),
            previous: self.previous.map(|previous| Sample {
                timestamp: previous.timestamp,
                coordinates: pick(&previous.coordinates),
            }),
            action,
        }
    }
}

impl Dof1Event {
    pub fn x(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn dx(&self) -> f64 {
        self.delta()[0]
    }
}

impl Dof2Event {
    pub fn x(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn y(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn dx(&self) -> f64 {
        self.delta()[0]
    }

    pub fn dy(&self) -> f64 {
        self.delta()[1]
    }

    /// Extracts the X channel when `from_x` is true, the Y channel otherwise.
    pub fn dof1_event(&self, from_x: bool) -> Dof1Event {
        self.demote(Self::channel(from_x), None)
    }

    pub fn dof1_event_with_action(&self, from_x: bool, action: Dof1Action) -> Dof1Event {
        self.demote(Self::channel(from_x), Some(action))
    }

    fn channel(from_x: bool) -> impl Fn(&[f64; 2]) -> [f64; 1] {
        let index = usize::from(!from_x);
        move |coordinates: &[f64; 2]| [coordinates[index]]
    }
}

impl Dof3Event {
    pub fn x(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn y(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn z(&self) -> f64 {
        self.coordinates[2]
    }

    /// Extracts the X and Y channels.
    pub fn dof2_event(&self) -> Dof2Event {
        self.demote(Self::planar, None)
    }

    pub fn dof2_event_with_action(&self, action: Dof2Action) -> Dof2Event {
        self.demote(Self::planar, Some(action))
    }

    fn planar(coordinates: &[f64; 3]) -> [f64; 2] {
        [coordinates[0], coordinates[1]]
    }
}

impl Dof6Event {
    pub fn x(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn y(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn z(&self) -> f64 {
        self.coordinates[2]
    }

    pub fn rx(&self) -> f64 {
        self.coordinates[3]
    }

    pub fn ry(&self) -> f64 {
        self.coordinates[4]
    }

    pub fn rz(&self) -> f64 {
        self.coordinates[5]
    }

    /// Extracts the translation channels when `from_translation` is true,
    /// the rotation channels otherwise.
    pub fn dof3_event(&self, from_translation: bool) -> Dof3Event {
        self.demote(Self::half(from_translation), None)
    }

    pub fn dof3_event_with_action(&self, from_translation: bool, action: Dof3Action) -> Dof3Event {
        self.demote(Self::half(from_translation), Some(action))
    }

    fn half(from_translation: bool) -> impl Fn(&[f64; 6]) -> [f64; 3] {
        let offset = if from_translation { 0 } else { 3 };
        move |coordinates: &[f64; 6]| {
            [
                coordinates[offset],
                coordinates[offset + 1],
                coordinates[offset + 2],
            ]
        }
    }
}

/// A (possibly multiple) click.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClickEvent {
    timestamp: u64,
    modifiers: Modifiers,
    button: Button,
    click_count: u8,
    action: Option<ClickAction>,
}

impl ClickEvent {
    pub fn new(modifiers: impl Into<Modifiers>, button: Button, click_count: u8) -> Self {
        Self {
            timestamp: 0,
            modifiers: modifiers.into(),
            button,
            click_count,
            action: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_action(mut self, action: ClickAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn button(&self) -> Button {
        self.button
    }

    pub fn click_count(&self) -> u8 {
        self.click_count
    }

    pub fn click_action(&self) -> Option<ClickAction> {
        self.action
    }

    pub fn set_action(&mut self, action: Option<ClickAction>) {
        self.action = action;
    }

    pub fn click_shortcut(&self) -> ClickShortcut {
        ClickShortcut::new(self.modifiers, self.button, self.click_count)
    }
}

/// A key stroke.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KeyboardEvent {
    timestamp: u64,
    modifiers: Modifiers,
    key: Key,
    action: Option<KeyboardAction>,
}

impl KeyboardEvent {
    pub fn new(modifiers: impl Into<Modifiers>, key: Key) -> Self {
        Self {
            timestamp: 0,
            modifiers: modifiers.into(),
            key,
            action: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_action(mut self, action: KeyboardAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn keyboard_action(&self) -> Option<KeyboardAction> {
        self.action
    }

    pub fn set_action(&mut self, action: Option<KeyboardAction>) {
        self.action = action;
    }

    pub fn keyboard_shortcut(&self) -> KeyboardShortcut {
        KeyboardShortcut::new(self.modifiers, self.key)
    }
}

/// Behavior shared by every event family.
#[enum_dispatch]
pub trait InputEvent {
    fn kind(&self) -> EventKind;
    /// Milliseconds, in the host clock.
    fn timestamp(&self) -> u64;
    fn modifiers(&self) -> Modifiers;
    /// Whether the event carries no motion.
    fn is_null(&self) -> bool;
    /// The shortcut bindings are looked up with.
    fn shortcut(&self) -> Shortcut;
    fn action(&self) -> Option<Action>;
}

impl<D: Dof> InputEvent for MotionEvent<D> {
    fn kind(&self) -> EventKind {
        D::KIND
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn is_null(&self) -> bool {
        self.motion().as_ref().iter().all(|value| value.abs() < EPSILON)
    }

    fn shortcut(&self) -> Shortcut {
        self.button_shortcut().into()
    }

    fn action(&self) -> Option<Action> {
        self.action.map(Into::into)
    }
}

impl InputEvent for ClickEvent {
    fn kind(&self) -> EventKind {
        EventKind::Click
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn is_null(&self) -> bool {
        self.click_count == 0
    }

    fn shortcut(&self) -> Shortcut {
        self.click_shortcut().into()
    }

    fn action(&self) -> Option<Action> {
        self.action.map(Action::Click)
    }
}

impl InputEvent for KeyboardEvent {
    fn kind(&self) -> EventKind {
        EventKind::Keyboard
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn is_null(&self) -> bool {
        false
    }

    fn shortcut(&self) -> Shortcut {
        self.keyboard_shortcut().into()
    }

    fn action(&self) -> Option<Action> {
        self.action.map(Action::Keyboard)
    }
}

/// An event of any family.
#[derive(Debug, Copy, Clone, PartialEq)]
#[enum_dispatch(InputEvent)]
pub enum Event {
    Click(ClickEvent),
    Keyboard(KeyboardEvent),
    Dof1(Dof1Event),
    Dof2(Dof2Event),
    Dof3(Dof3Event),
    Dof6(Dof6Event),
}

impl Event {
    /// Attaches `action` to the event, or detaches it for `None`.
    ///
    /// Lower arity motion actions are promoted to the event arity. Actions of
    /// another family leave the event untouched and are reported as an error.
    pub fn set_action(&mut self, action: Option<Action>) -> Result<(), EventError> {
        let Some(action) = action else {
            match self {
                Self::Click(event) => event.set_action(None),
                Self::Keyboard(event) => event.set_action(None),
                Self::Dof1(event) => event.set_action(None),
                Self::Dof2(event) => event.set_action(None),
                Self::Dof3(event) => event.set_action(None),
                Self::Dof6(event) => event.set_action(None),
            }
            return Ok(());
        };

        let mismatch = EventError::ArityMismatch {
            action: action.kind(),
            event: self.kind(),
        };
        match self {
            Self::Click(event) => match action {
                Action::Click(action) => event.set_action(Some(action)),
                Action::Keyboard(action) => event.set_action(Some(action.into())),
                _ => return Err(mismatch),
            },
            Self::Keyboard(event) => match action {
                Action::Keyboard(action) => event.set_action(Some(action)),
                Action::Click(action) => event.set_action(Some(action.into())),
                _ => return Err(mismatch),
            },
            Self::Dof1(event) => event.set_action(Some(Dof1::action_from(action).ok_or(mismatch)?)),
            Self::Dof2(event) => event.set_action(Some(Dof2::action_from(action).ok_or(mismatch)?)),
            Self::Dof3(event) => event.set_action(Some(Dof3::action_from(action).ok_or(mismatch)?)),
            Self::Dof6(event) => event.set_action(Some(Dof6::action_from(action).ok_or(mismatch)?)),
        }
        Ok(())
    }

    pub fn with_action(mut self, action: impl Into<Action>) -> Result<Self, EventError> {
        self.set_action(Some(action.into()))?;
        Ok(self)
    }

    pub fn as_dof2(&self) -> Option<&Dof2Event> {
        match self {
            Self::Dof2(event) => Some(event),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Actionable;
    use crate::shortcut::Modifier;

    use super::*;

    fn pointer(previous: [f64; 2], current: [f64; 2]) -> Dof2Event {
        let first =
            Dof2Event::new(Modifiers::empty(), Some(Button::Left), previous).with_timestamp(10);
        first.next(current).with_timestamp(30)
    }

    #[test]
    fn relative_events_compute_deltas() {
        let event = pointer([1.0, 2.0], [4.0, 6.0]);
        assert!(event.is_relative());
        assert_eq!(event.delta(), [3.0, 4.0]);
        assert_eq!(event.delay(), 20);
        assert!((event.speed() - 0.25).abs() < 1e-12);
        assert!(!event.is_null());
    }

    #[test]
    fn absolute_events_have_no_delta() {
        let event = Dof2Event::new(Modifiers::empty(), None, [4.0, 6.0]);
        assert!(event.is_absolute());
        assert_eq!(event.delta(), [0.0, 0.0]);
        assert_eq!(event.motion(), [4.0, 6.0]);
        assert_eq!(event.speed(), 0.0);
    }

    #[test]
    fn pointer_demotes_to_either_axis() {
        let event = pointer([1.0, 2.0], [4.0, 6.0]);

        let x = event.dof1_event(true);
        assert!(x.is_relative());
        assert_eq!(x.previous_coordinates(), Some([1.0]));
        assert_eq!(x.coordinates(), [4.0]);

        let y = event.dof1_event(false);
        assert_eq!(y.previous_coordinates(), Some([2.0]));
        assert_eq!(y.coordinates(), [6.0]);
        assert_eq!(y.dx(), 4.0);

        // The source is untouched.
        assert_eq!(event.coordinates(), [4.0, 6.0]);
    }

    #[test]
    fn absolute_demotion_has_no_previous() {
        let event = Dof2Event::new(Modifier::Shift, None, [4.0, 6.0]);
        let x = event.dof1_event_with_action(true, Dof1Action::TranslateX);
        assert!(x.is_absolute());
        assert_eq!(x.coordinates(), [4.0]);
        assert_eq!(x.dof_action(), Some(Dof1Action::TranslateX));
        assert_eq!(x.modifiers(), Modifiers::from(Modifier::Shift));
    }

    #[test]
    fn higher_arities_demote() {
        let first = Dof6Event::new(Modifiers::empty(), None, [0.0; 6]);
        let event = first.next([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let rotation = event.dof3_event(false);
        assert_eq!(rotation.delta(), [4.0, 5.0, 6.0]);
        let translation = event.dof3_event(true);
        assert_eq!(translation.coordinates(), [1.0, 2.0, 3.0]);

        let planar = translation.dof2_event_with_action(Dof2Action::Translate);
        assert_eq!(planar.delta(), [1.0, 2.0]);
        assert!(planar.is_relative());
        assert_eq!(planar.dof_action(), Some(Dof2Action::Translate));
    }

    #[test]
    fn events_expose_their_shortcuts() {
        let event = Event::from(Dof2Event::new(Modifier::Ctrl, Some(Button::Right), [0.0, 0.0]));
        assert_eq!(
            event.shortcut(),
            Shortcut::Button(ButtonShortcut::new(Modifier::Ctrl, Some(Button::Right)))
        );
        assert_eq!(event.kind(), EventKind::Dof2);

        let click = Event::from(ClickEvent::new(Modifiers::empty(), Button::Left, 2));
        assert_eq!(click.shortcut().to_string(), "LEFT*2");
    }

    #[test]
    fn lower_arity_actions_are_promoted() {
        let mut event = Event::from(Dof3Event::new(Modifiers::empty(), None, [0.0; 3]));
        event.set_action(Some(Dof1Action::RotateZ.into())).unwrap();
        assert_eq!(event.action(), Some(Action::Dof3(Dof3Action::RotateZ)));
        assert_eq!(event.action().map(|action| action.dofs()), Some(1));

        event.set_action(None).unwrap();
        assert_eq!(event.action(), None);
    }

    #[test]
    fn mismatching_actions_are_rejected() {
        let mut event = Event::from(Dof1Event::new(Modifiers::empty(), None, [1.0]));
        assert_eq!(
            event.set_action(Some(Dof2Action::Rotate.into())),
            Err(EventError::ArityMismatch {
                action: EventKind::Dof2,
                event: EventKind::Dof1,
            })
        );
        assert_eq!(event.action(), None);

        let click = Event::from(ClickEvent::new(Modifiers::empty(), Button::Left, 1));
        assert!(click.with_action(KeyboardAction::AlignFrame).is_ok());
    }
}
