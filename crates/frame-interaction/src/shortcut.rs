//! Shortcuts identify the physical input combination that triggers an action.
//!
//! Shortcuts are plain values compared by all their fields, so they are used
//! directly as binding table keys. Every shortcut has a textual form, e.g.
//! `CTRL+SHIFT+LEFT`, `LEFT*2` (double click), `ALT+a` or `CTRL+ESCAPE`,
//! produced by [`Display`](fmt::Display) and read back by [`FromStr`].

use std::fmt;
use std::str::FromStr;

use enumset::{EnumSet, EnumSetType};

use crate::error::ShortcutParseError;

/// Keyboard modifier held while an event was produced.
#[derive(Debug, EnumSetType, Hash)]
pub enum Modifier {
    Shift,
    Ctrl,
    Meta,
    Alt,
    AltGraph,
}

/// Set of held modifiers.
pub type Modifiers = EnumSet<Modifier>;

impl Modifier {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shift => "SHIFT",
            Self::Ctrl => "CTRL",
            Self::Meta => "META",
            Self::Alt => "ALT",
            Self::AltGraph => "ALT_GRAPH",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "SHIFT" => Some(Self::Shift),
            "CTRL" | "CONTROL" => Some(Self::Ctrl),
            "META" | "CMD" => Some(Self::Meta),
            "ALT" => Some(Self::Alt),
            "ALT_GRAPH" | "ALTGR" => Some(Self::AltGraph),
            _ => None,
        }
    }
}

/// Pointer device button.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Middle,
    Right,
    /// Any additional button, by device-specific id.
    Other(u16),
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("LEFT"),
            Self::Middle => f.write_str("MIDDLE"),
            Self::Right => f.write_str("RIGHT"),
            Self::Other(id) => write!(f, "BUTTON_{id}"),
        }
    }
}

impl FromStr for Button {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "LEFT" => Ok(Self::Left),
            "MIDDLE" | "CENTER" => Ok(Self::Middle),
            "RIGHT" => Ok(Self::Right),
            _ => upper
                .strip_prefix("BUTTON_")
                .and_then(|id| id.parse().ok())
                .map(Self::Other)
                .ok_or_else(|| ShortcutParseError::UnknownButton(s.to_owned())),
        }
    }
}

/// Named virtual key codes.
const NAMED_KEYS: &[(&str, u32)] = &[
    ("BACKSPACE", 8),
    ("TAB", 9),
    ("ENTER", 10),
    ("ESCAPE", 27),
    ("SPACE", 32),
    ("PAGE_UP", 33),
    ("PAGE_DOWN", 34),
    ("END", 35),
    ("HOME", 36),
    ("LEFT", 37),
    ("UP", 38),
    ("RIGHT", 39),
    ("DOWN", 40),
    ("DELETE", 127),
];

/// Characters that would clash with the description syntax, written by name.
const NAMED_CHARS: &[(&str, char)] = &[("PLUS", '+')];

/// Keyboard key, either a typed character or a virtual key code.
///
/// `+` is written `PLUS` in descriptions. Whitespace characters have no
/// textual form; use their virtual key code (e.g. `SPACE`) instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Code(u32),
}

impl Key {
    pub const BACKSPACE: Self = Self::Code(8);
    pub const TAB: Self = Self::Code(9);
    pub const ENTER: Self = Self::Code(10);
    pub const ESCAPE: Self = Self::Code(27);
    pub const LEFT: Self = Self::Code(37);
    pub const UP: Self = Self::Code(38);
    pub const RIGHT: Self = Self::Code(39);
    pub const DOWN: Self = Self::Code(40);
    pub const DELETE: Self = Self::Code(127);
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => match NAMED_CHARS.iter().find(|(_, named)| named == c) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "{c}"),
            },
            Self::Code(code) => match NAMED_KEYS.iter().find(|(_, named)| named == code) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "VK_{code}"),
            },
        }
    }
}

impl FromStr for Key {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::Char(c));
        }

        let upper = s.to_ascii_uppercase();
        if let Some((_, c)) = NAMED_CHARS.iter().find(|(name, _)| *name == upper) {
            return Ok(Self::Char(*c));
        }
        if let Some((_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == upper) {
            return Ok(Self::Code(*code));
        }
        upper
            .strip_prefix("VK_")
            .and_then(|code| code.parse().ok())
            .map(Self::Code)
            .ok_or_else(|| ShortcutParseError::UnknownKey(s.to_owned()))
    }
}

/// Shortcut of motion events: held modifiers and, optionally, a pressed button.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct ButtonShortcut {
    pub modifiers: Modifiers,
    pub button: Option<Button>,
}

impl ButtonShortcut {
    pub fn new(modifiers: impl Into<Modifiers>, button: Option<Button>) -> Self {
        Self {
            modifiers: modifiers.into(),
            button,
        }
    }

    /// Shortcut of a motion with `button` held and no modifiers.
    pub fn button(button: Button) -> Self {
        Self::new(Modifiers::empty(), Some(button))
    }
}

/// Shortcut of click events: modifiers, button and number of clicks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClickShortcut {
    pub modifiers: Modifiers,
    pub button: Button,
    pub click_count: u8,
}

impl ClickShortcut {
    pub fn new(modifiers: impl Into<Modifiers>, button: Button, click_count: u8) -> Self {
        Self {
            modifiers: modifiers.into(),
            button,
            click_count,
        }
    }
}

/// Shortcut of keyboard events: modifiers and key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct KeyboardShortcut {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl KeyboardShortcut {
    pub fn new(modifiers: impl Into<Modifiers>, key: Key) -> Self {
        Self {
            modifiers: modifiers.into(),
            key,
        }
    }

    pub fn char(c: char) -> Self {
        Self::new(Modifiers::empty(), Key::Char(c))
    }
}

/// Any shortcut.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Shortcut {
    Button(ButtonShortcut),
    Click(ClickShortcut),
    Keyboard(KeyboardShortcut),
}

impl Shortcut {
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Button(shortcut) => shortcut.modifiers,
            Self::Click(shortcut) => shortcut.modifiers,
            Self::Keyboard(shortcut) => shortcut.modifiers,
        }
    }

    pub(crate) fn family(&self) -> &'static str {
        match self {
            Self::Button(_) => "button",
            Self::Click(_) => "click",
            Self::Keyboard(_) => "keyboard",
        }
    }
}

impl From<ButtonShortcut> for Shortcut {
    fn from(shortcut: ButtonShortcut) -> Self {
        Self::Button(shortcut)
    }
}

impl From<ClickShortcut> for Shortcut {
    fn from(shortcut: ClickShortcut) -> Self {
        Self::Click(shortcut)
    }
}

impl From<KeyboardShortcut> for Shortcut {
    fn from(shortcut: KeyboardShortcut) -> Self {
        Self::Keyboard(shortcut)
    }
}

fn write_modifiers(f: &mut fmt::Formatter<'_>, modifiers: Modifiers) -> fmt::Result {
    for modifier in modifiers {
        write!(f, "{}+", modifier.name())?;
    }
    Ok(())
}

/// Splits a description in its modifiers and its trailing trigger token, if any.
fn split_description(s: &str) -> Result<(Modifiers, Option<&str>), ShortcutParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ShortcutParseError::Empty);
    }

    let tokens: Vec<&str> = s.split('+').map(str::trim).collect();
    let (last, init) = tokens.split_last().ok_or(ShortcutParseError::Empty)?;

    let mut modifiers = Modifiers::empty();
    for token in init {
        modifiers |= Modifier::parse(token)
            .ok_or_else(|| ShortcutParseError::UnknownModifier((*token).to_owned()))?;
    }

    if last.is_empty() {
        return Err(ShortcutParseError::Empty);
    }
    match Modifier::parse(last) {
        Some(modifier) => {
            modifiers |= modifier;
            Ok((modifiers, None))
        }
        _ => Ok((modifiers, Some(last))),
    }
}

impl fmt::Display for ButtonShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.button {
            Some(button) => {
                write_modifiers(f, self.modifiers)?;
                write!(f, "{button}")
            }
            None if self.modifiers.is_empty() => f.write_str("NO_BUTTON"),
            None => {
                let mut names = self.modifiers.iter().map(Modifier::name);
                if let Some(first) = names.next() {
                    f.write_str(first)?;
                }
                for name in names {
                    write!(f, "+{name}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for ButtonShortcut {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (modifiers, trigger) = split_description(s)?;
        let button = match trigger {
            None => None,
            Some(token)
                if token.eq_ignore_ascii_case("NO_BUTTON") || token.eq_ignore_ascii_case("NONE") =>
            {
                None
            }
            Some(token) => Some(token.parse()?),
        };
        Ok(Self { modifiers, button })
    }
}

impl fmt::Display for ClickShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_modifiers(f, self.modifiers)?;
        if self.click_count == 1 {
            write!(f, "{}", self.button)
        } else {
            write!(f, "{}*{}", self.button, self.click_count)
        }
    }
}

impl FromStr for ClickShortcut {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (modifiers, trigger) = split_description(s)?;
        let trigger = trigger.ok_or_else(|| ShortcutParseError::UnknownButton(s.to_owned()))?;
        let (button, click_count) = match trigger.split_once('*') {
            Some((button, count)) => (
                button,
                count
                    .parse()
                    .ok()
                    .filter(|count| *count > 0)
                    .ok_or_else(|| ShortcutParseError::InvalidClickCount(s.to_owned()))?,
            ),
            None => (trigger, 1),
        };
        Ok(Self {
            modifiers,
            button: button.parse()?,
            click_count,
        })
    }
}

impl fmt::Display for KeyboardShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_modifiers(f, self.modifiers)?;
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyboardShortcut {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (modifiers, trigger) = split_description(s)?;
        let trigger = trigger.ok_or_else(|| ShortcutParseError::UnknownKey(s.to_owned()))?;
        Ok(Self {
            modifiers,
            key: trigger.parse()?,
        })
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button(shortcut) => shortcut.fmt(f),
            Self::Click(shortcut) => shortcut.fmt(f),
            Self::Keyboard(shortcut) => shortcut.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use enumset::enum_set;
    use proptest::prelude::*;

    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn modifiers() -> impl Strategy<Value = Modifiers> {
        any::<u8>().prop_map(|bits| {
            EnumSet::<Modifier>::all()
                .iter()
                .enumerate()
                .filter(|(index, _)| bits & (1 << index) != 0)
                .map(|(_, modifier)| modifier)
                .collect()
        })
    }

    fn button() -> impl Strategy<Value = Button> {
        prop_oneof![
            Just(Button::Left),
            Just(Button::Middle),
            Just(Button::Right),
            (0u16..16).prop_map(Button::Other),
        ]
    }

    proptest! {
        #[test]
        fn equal_button_shortcuts_hash_equal(modifiers in modifiers(), button in proptest::option::of(button())) {
            let a = ButtonShortcut::new(modifiers, button);
            let b = ButtonShortcut::new(modifiers, button);
            prop_assert_eq!(a, b);
            prop_assert_eq!(hash_of(&a), hash_of(&b));
            prop_assert_eq!(hash_of(&Shortcut::from(a)), hash_of(&Shortcut::from(b)));
        }

        #[test]
        fn equal_keyboard_shortcuts_hash_equal(modifiers in modifiers(), c in any::<char>()) {
            let a = KeyboardShortcut::new(modifiers, Key::Char(c));
            let b = KeyboardShortcut::new(modifiers, Key::Char(c));
            prop_assert_eq!(a, b);
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }

        #[test]
        fn keyboard_shortcut_descriptions_parse_back(
            modifiers in modifiers(),
            c in any::<char>().prop_filter("has a textual form", |c| !c.is_whitespace()),
        ) {
            let shortcut = KeyboardShortcut::new(modifiers, Key::Char(c));
            prop_assert_eq!(shortcut.to_string().parse::<KeyboardShortcut>(), Ok(shortcut));
        }

        #[test]
        fn button_shortcut_descriptions_parse_back(modifiers in modifiers(), button in proptest::option::of(button())) {
            let shortcut = ButtonShortcut::new(modifiers, button);
            prop_assert_eq!(shortcut.to_string().parse::<ButtonShortcut>(), Ok(shortcut));
        }
    }

    #[test]
    fn different_buttons_differ() {
        assert_ne!(
            ButtonShortcut::button(Button::Left),
            ButtonShortcut::button(Button::Right)
        );
        assert_ne!(
            ClickShortcut::new(Modifiers::empty(), Button::Left, 1),
            ClickShortcut::new(Modifiers::empty(), Button::Left, 2)
        );
    }

    #[test]
    fn parses_modifiers_and_buttons() {
        let shortcut: ButtonShortcut = "ctrl+Shift+LEFT".parse().unwrap();
        assert_eq!(
            shortcut,
            ButtonShortcut::new(enum_set!(Modifier::Ctrl | Modifier::Shift), Some(Button::Left))
        );
        assert_eq!(shortcut.to_string(), "SHIFT+CTRL+LEFT");

        let modifier_only: ButtonShortcut = "ALT".parse().unwrap();
        assert_eq!(modifier_only, ButtonShortcut::new(Modifier::Alt, None));
        assert_eq!("NO_BUTTON".parse(), Ok(ButtonShortcut::default()));
    }

    #[test]
    fn parses_click_counts() {
        let shortcut: ClickShortcut = "META+RIGHT*2".parse().unwrap();
        assert_eq!(shortcut, ClickShortcut::new(Modifier::Meta, Button::Right, 2));
        assert_eq!(shortcut.to_string(), "META+RIGHT*2");
        assert_eq!(
            "LEFT*0".parse::<ClickShortcut>(),
            Err(ShortcutParseError::InvalidClickCount("LEFT*0".to_owned()))
        );
    }

    #[test]
    fn parses_keys() {
        assert_eq!(
            "ALT+a".parse(),
            Ok(KeyboardShortcut::new(Modifier::Alt, Key::Char('a')))
        );
        assert_eq!(
            "ctrl+escape".parse(),
            Ok(KeyboardShortcut::new(Modifier::Ctrl, Key::ESCAPE))
        );
        assert_eq!("VK_112".parse(), Ok(KeyboardShortcut::new(Modifiers::empty(), Key::Code(112))));
        assert_eq!(KeyboardShortcut::new(Modifier::Shift, Key::UP).to_string(), "SHIFT+UP");

        let plus = KeyboardShortcut::new(Modifier::Ctrl, Key::Char('+'));
        assert_eq!(plus.to_string(), "CTRL+PLUS");
        assert_eq!("ctrl+plus".parse(), Ok(plus));
    }

    #[test]
    fn rejects_malformed_descriptions() {
        assert_eq!("".parse::<ButtonShortcut>(), Err(ShortcutParseError::Empty));
        assert_eq!(
            "HYPER+LEFT".parse::<ButtonShortcut>(),
            Err(ShortcutParseError::UnknownModifier("HYPER".to_owned()))
        );
        assert_eq!(
            "CTRL+WHEEL".parse::<ButtonShortcut>(),
            Err(ShortcutParseError::UnknownButton("WHEEL".to_owned()))
        );
        assert_eq!(
            "CTRL+FOO".parse::<KeyboardShortcut>(),
            Err(ShortcutParseError::UnknownKey("FOO".to_owned()))
        );
    }
}
