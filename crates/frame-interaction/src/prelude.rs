pub use crate::action::{
    Action, Actionable, ClickAction, Dof1Action, Dof2Action, Dof3Action, Dof6Action,
    GlobalAction, GlobalActions, KeyboardAction,
};
pub use crate::agent::{Agent, AgentId, Grabbable, GrabberHandle};
pub use crate::config::InteractionConfig;
pub use crate::constraint::{
    AxisPlane, AxisPlaneConstraint, Constraint, ConstraintSpace, ScalingConstraint,
};
pub use crate::error::{BindingError, EventError, ShortcutParseError};
pub use crate::event::{
    ClickEvent, Dof, Dof1, Dof1Event, Dof2, Dof2Event, Dof3, Dof3Event, Dof6, Dof6Event, Event,
    EventKind, InputEvent, KeyboardEvent, MotionEvent,
};
pub use crate::frame::{Frame, SharedFrame};
pub use crate::handler::{EventGrabberTuple, InputHandler};
pub use crate::interactive::InteractiveFrame;
pub use crate::math::{DQuat, DVec2, DVec3, Transform};
pub use crate::profile::{Bindings, Profile};
pub use crate::shortcut::{
    Button, ButtonShortcut, ClickShortcut, Key, KeyboardShortcut, Modifier, Modifiers, Shortcut,
};
pub use crate::timer::{FrameClock, JobId, ManualClock, SystemClock, Taskable, TimerPool};

pub use enumset::{enum_set, EnumSet};

pub use mint;
