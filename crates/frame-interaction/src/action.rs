use std::fmt;

use enum_dispatch::enum_dispatch;
use enumset::{enum_set, EnumSet, EnumSetType};

use crate::event::EventKind;

/// Semantic action an interactive frame knows how to perform,
/// independent of the input arity that triggered it.
#[derive(Debug, EnumSetType, Hash)]
pub enum GlobalAction {
    AlignFrame,
    CenterFrame,
    Select,
    Deselect,
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
    Scale,
    Translate,
    Rotate,
    ScreenTranslate,
    ScreenRotate,
    TranslateXYZ,
    RotateXYZ,
    TranslateXYZRotateXYZ,
}

/// Set of global actions.
pub type GlobalActions = EnumSet<GlobalAction>;

impl GlobalAction {
    pub const fn description(self) -> &'static str {
        match self {
            Self::AlignFrame => "Align frame with world",
            Self::CenterFrame => "Center frame",
            Self::Select => "Select frame",
            Self::Deselect => "Deselect frame",
            Self::TranslateX => "Translate frame along X axis",
            Self::TranslateY => "Translate frame along Y axis",
            Self::TranslateZ => "Translate frame along Z axis",
            Self::RotateX => "Rotate frame around X axis",
            Self::RotateY => "Rotate frame around Y axis",
            Self::RotateZ => "Rotate frame around Z axis",
            Self::Scale => "Scale frame",
            Self::Translate => "Translate frame",
            Self::Rotate => "Rotate frame",
            Self::ScreenTranslate => "Translate frame on screen plane",
            Self::ScreenRotate => "Rotate frame around screen normal",
            Self::TranslateXYZ => "Translate frame along X, Y and Z axes",
            Self::RotateXYZ => "Rotate frame around X, Y and Z axes",
            Self::TranslateXYZRotateXYZ => "Translate and rotate frame in 3D",
        }
    }

    /// Whether the action makes sense in a 2D scene.
    pub fn is_2d(self) -> bool {
        !Self::only_3d().contains(self)
    }

    /// Actions needing a third dimension.
    pub const fn only_3d() -> GlobalActions {
        enum_set!(
            Self::TranslateZ
                | Self::RotateX
                | Self::RotateY
                | Self::TranslateXYZ
                | Self::RotateXYZ
                | Self::TranslateXYZRotateXYZ
        )
    }

    /// Degrees of freedom an event needs to carry to perform the action.
    pub const fn dofs(self) -> usize {
        match self {
            Self::AlignFrame | Self::CenterFrame | Self::Select | Self::Deselect => 0,
            Self::TranslateX
            | Self::TranslateY
            | Self::TranslateZ
            | Self::RotateX
            | Self::RotateY
            | Self::RotateZ
            | Self::Scale => 1,
            Self::Translate | Self::Rotate | Self::ScreenTranslate | Self::ScreenRotate => 2,
            Self::TranslateXYZ | Self::RotateXYZ => 3,
            Self::TranslateXYZRotateXYZ => 6,
        }
    }
}

impl fmt::Display for GlobalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Common behavior of the per-arity action enums.
#[enum_dispatch]
pub trait Actionable {
    /// The semantic action this variant stands for.
    fn global(&self) -> GlobalAction;

    fn description(&self) -> &'static str {
        self.global().description()
    }

    fn is_2d(&self) -> bool {
        self.global().is_2d()
    }

    fn dofs(&self) -> usize {
        self.global().dofs()
    }
}

macro_rules! arity_actions {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// The variant standing for `action`, if this arity has one.
            pub fn from_global(action: GlobalAction) -> Option<Self> {
                match action {
                    $(GlobalAction::$variant => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }

        impl Actionable for $name {
            fn global(&self) -> GlobalAction {
                match self {
                    $(Self::$variant => GlobalAction::$variant),*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

macro_rules! promote {
    ($from:ident => $to:ident { $($variant:ident),* $(,)? }) => {
        impl From<$from> for $to {
            fn from(action: $from) -> Self {
                match action {
                    $($from::$variant => Self::$variant),*
                }
            }
        }
    };
}

arity_actions! {
    /// Actions triggered by clicks.
    ClickAction { AlignFrame, CenterFrame, Select, Deselect }
}

arity_actions! {
    /// Actions triggered by key strokes.
    KeyboardAction { AlignFrame, CenterFrame, Select, Deselect }
}

arity_actions! {
    /// Actions driven by a single axis, e.g. a mouse wheel.
    Dof1Action { TranslateX, TranslateY, TranslateZ, RotateX, RotateY, RotateZ, Scale }
}

arity_actions! {
    /// Actions driven by a pointer.
    Dof2Action {
        TranslateX, TranslateY, TranslateZ, RotateX, RotateY, RotateZ, Scale,
        Translate, Rotate, ScreenTranslate, ScreenRotate,
    }
}

arity_actions! {
    Dof3Action {
        TranslateX, TranslateY, TranslateZ, RotateX, RotateY, RotateZ, Scale,
        Translate, Rotate, ScreenTranslate, ScreenRotate,
        TranslateXYZ, RotateXYZ,
    }
}

arity_actions! {
    /// Actions driven by six degrees of freedom devices such as space navigators.
    Dof6Action {
        TranslateX, TranslateY, TranslateZ, RotateX, RotateY, RotateZ, Scale,
        Translate, Rotate, ScreenTranslate, ScreenRotate,
        TranslateXYZ, RotateXYZ, TranslateXYZRotateXYZ,
    }
}

promote!(ClickAction => KeyboardAction { AlignFrame, CenterFrame, Select, Deselect });
promote!(KeyboardAction => ClickAction { AlignFrame, CenterFrame, Select, Deselect });
promote!(Dof1Action => Dof2Action {
    TranslateX, TranslateY, TranslateZ, RotateX, RotateY, RotateZ, Scale,
});
promote!(Dof2Action => Dof3Action {
    TranslateX, TranslateY, TranslateZ, RotateX, RotateY, RotateZ, Scale,
    Translate, Rotate, ScreenTranslate, ScreenRotate,
});
promote!(Dof3Action => Dof6Action {
    TranslateX, TranslateY, TranslateZ, RotateX, RotateY, RotateZ, Scale,
    Translate, Rotate, ScreenTranslate, ScreenRotate,
    TranslateXYZ, RotateXYZ,
});

impl From<Dof1Action> for Dof3Action {
    fn from(action: Dof1Action) -> Self {
        Dof2Action::from(action).into()
    }
}

impl From<Dof1Action> for Dof6Action {
    fn from(action: Dof1Action) -> Self {
        Dof3Action::from(action).into()
    }
}

impl From<Dof2Action> for Dof6Action {
    fn from(action: Dof2Action) -> Self {
        Dof3Action::from(action).into()
    }
}

/// An action of any arity, as attached to an [`Event`](crate::event::Event).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[enum_dispatch(Actionable)]
pub enum Action {
    Click(ClickAction),
    Keyboard(KeyboardAction),
    Dof1(Dof1Action),
    Dof2(Dof2Action),
    Dof3(Dof3Action),
    Dof6(Dof6Action),
}

impl Action {
    /// Kind of events this action was declared for.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click(_) => EventKind::Click,
            Self::Keyboard(_) => EventKind::Keyboard,
            Self::Dof1(_) => EventKind::Dof1,
            Self::Dof2(_) => EventKind::Dof2,
            Self::Dof3(_) => EventKind::Dof3,
            Self::Dof6(_) => EventKind::Dof6,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.global())
    }
}
