use thiserror::Error;

use crate::event::EventKind;

/// Error returned when a textual shortcut description cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutParseError {
    #[error("empty shortcut description")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown button `{0}`")]
    UnknownButton(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("invalid click count in `{0}`")]
    InvalidClickCount(String),
}

/// Error returned when an action cannot be attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("a {action} action cannot be attached to a {event} event")]
    ArityMismatch { action: EventKind, event: EventKind },
}

/// Error returned when a binding cannot be added to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("a {shortcut} shortcut cannot trigger a {action} action")]
    ShortcutMismatch {
        shortcut: &'static str,
        action: EventKind,
    },
    #[error(transparent)]
    Parse(#[from] ShortcutParseError),
}
