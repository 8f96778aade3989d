use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;
use tracing::debug;

use crate::action::{
    Action, Actionable, ClickAction, Dof1Action, Dof2Action, Dof3Action, Dof6Action,
    GlobalAction, KeyboardAction,
};
use crate::error::BindingError;
use crate::event::{Event, EventKind, InputEvent};
use crate::shortcut::{
    Button, ButtonShortcut, ClickShortcut, Key, KeyboardShortcut, Modifier, Modifiers, Shortcut,
};

/// Table mapping shortcuts to the actions they trigger, for one event family.
///
/// A shortcut triggers at most one action; an action may be bound to any
/// number of shortcuts.
#[derive(Debug, Clone)]
pub struct Bindings<K, A> {
    map: AHashMap<K, A>,
}

impl<K, A> Default for Bindings<K, A> {
    fn default() -> Self {
        Self {
            map: AHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash, A: Copy + PartialEq> Bindings<K, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `shortcut` to `action`, returning the action it was bound to before.
    pub fn bind(&mut self, shortcut: K, action: A) -> Option<A> {
        self.map.insert(shortcut, action)
    }

    pub fn unbind(&mut self, shortcut: &K) -> Option<A> {
        self.map.remove(shortcut)
    }

    /// Unbinds every shortcut bound to `action`. Returns how many were removed.
    pub fn remove_action(&mut self, action: A) -> usize {
        let before = self.map.len();
        self.map.retain(|_, bound| *bound != action);
        before - self.map.len()
    }

    pub fn action(&self, shortcut: &K) -> Option<A> {
        self.map.get(shortcut).copied()
    }

    pub fn is_bound(&self, shortcut: &K) -> bool {
        self.map.contains_key(shortcut)
    }

    pub fn is_action_bound(&self, action: A) -> bool {
        self.map.values().any(|bound| *bound == action)
    }

    /// Shortcuts bound to `action`.
    pub fn shortcuts(&self, action: A) -> impl Iterator<Item = K> + '_ {
        self.map
            .iter()
            .filter(move |(_, bound)| **bound == action)
            .map(|(shortcut, _)| *shortcut)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &A)> {
        self.map.iter()
    }
}

/// The binding tables of an agent, one per event family.
///
/// Keyboard-like profiles may also configure a selection and a deselection
/// action, which the agent intercepts to change its grabber.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    click: Bindings<ClickShortcut, ClickAction>,
    keyboard: Bindings<KeyboardShortcut, KeyboardAction>,
    dof1: Bindings<ButtonShortcut, Dof1Action>,
    dof2: Bindings<ButtonShortcut, Dof2Action>,
    dof3: Bindings<ButtonShortcut, Dof3Action>,
    dof6: Bindings<ButtonShortcut, Dof6Action>,
    selection_action: Option<GlobalAction>,
    deselection_action: Option<GlobalAction>,
}

impl Profile {
    /// An empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer and wheel bindings.
    ///
    /// | Shortcut        | Action          |
    /// |-----------------|-----------------|
    /// | `LEFT`          | rotate          |
    /// | `RIGHT`         | translate       |
    /// | `SHIFT+LEFT`    | screen rotate   |
    /// | `SHIFT+RIGHT`   | screen translate|
    /// | `MIDDLE`        | scale           |
    /// | wheel           | scale           |
    /// | `SHIFT` + wheel | translate Z     |
    /// | `LEFT*2`        | align frame     |
    /// | `RIGHT*2`       | center frame    |
    pub fn mouse() -> Self {
        let mut profile = Self::new();

        let dof2 = &mut profile.dof2;
        dof2.bind(ButtonShortcut::button(Button::Left), Dof2Action::Rotate);
        dof2.bind(ButtonShortcut::button(Button::Right), Dof2Action::Translate);
        dof2.bind(
            ButtonShortcut::new(Modifier::Shift, Some(Button::Left)),
            Dof2Action::ScreenRotate,
        );
        dof2.bind(
            ButtonShortcut::new(Modifier::Shift, Some(Button::Right)),
            Dof2Action::ScreenTranslate,
        );
        dof2.bind(ButtonShortcut::button(Button::Middle), Dof2Action::Scale);

        let dof1 = &mut profile.dof1;
        dof1.bind(ButtonShortcut::default(), Dof1Action::Scale);
        dof1.bind(ButtonShortcut::new(Modifier::Shift, None), Dof1Action::TranslateZ);

        let click = &mut profile.click;
        click.bind(
            ClickShortcut::new(Modifiers::empty(), Button::Left, 2),
            ClickAction::AlignFrame,
        );
        click.bind(
            ClickShortcut::new(Modifiers::empty(), Button::Right, 2),
            ClickAction::CenterFrame,
        );

        profile
    }

    /// Keyboard bindings, with `ENTER` selecting and `ESCAPE` deselecting the grabber.
    pub fn keyboard() -> Self {
        let mut profile = Self::new();

        let keyboard = &mut profile.keyboard;
        keyboard.bind(KeyboardShortcut::char('a'), KeyboardAction::AlignFrame);
        keyboard.bind(KeyboardShortcut::char('c'), KeyboardAction::CenterFrame);
        keyboard.bind(
            KeyboardShortcut::new(Modifiers::empty(), Key::ENTER),
            KeyboardAction::Select,
        );
        keyboard.bind(
            KeyboardShortcut::new(Modifiers::empty(), Key::ESCAPE),
            KeyboardAction::Deselect,
        );

        profile.selection_action = Some(GlobalAction::Select);
        profile.deselection_action = Some(GlobalAction::Deselect);
        profile
    }

    /// Space navigator bindings.
    pub fn six_dof() -> Self {
        let mut profile = Self::new();

        let dof6 = &mut profile.dof6;
        dof6.bind(ButtonShortcut::default(), Dof6Action::TranslateXYZRotateXYZ);
        dof6.bind(ButtonShortcut::new(Modifier::Shift, None), Dof6Action::TranslateXYZ);
        dof6.bind(ButtonShortcut::new(Modifier::Ctrl, None), Dof6Action::RotateXYZ);

        profile
            .dof3
            .bind(ButtonShortcut::default(), Dof3Action::TranslateXYZ);
        profile
    }

    pub fn click_bindings(&self) -> &Bindings<ClickShortcut, ClickAction> {
        &self.click
    }

    pub fn click_bindings_mut(&mut self) -> &mut Bindings<ClickShortcut, ClickAction> {
        &mut self.click
    }

    pub fn keyboard_bindings(&self) -> &Bindings<KeyboardShortcut, KeyboardAction> {
        &self.keyboard
    }

    pub fn keyboard_bindings_mut(&mut self) -> &mut Bindings<KeyboardShortcut, KeyboardAction> {
        &mut self.keyboard
    }

    pub fn dof1_bindings(&self) -> &Bindings<ButtonShortcut, Dof1Action> {
        &self.dof1
    }

    pub fn dof1_bindings_mut(&mut self) -> &mut Bindings<ButtonShortcut, Dof1Action> {
        &mut self.dof1
    }

    pub fn dof2_bindings(&self) -> &Bindings<ButtonShortcut, Dof2Action> {
        &self.dof2
    }

    pub fn dof2_bindings_mut(&mut self) -> &mut Bindings<ButtonShortcut, Dof2Action> {
        &mut self.dof2
    }

    pub fn dof3_bindings(&self) -> &Bindings<ButtonShortcut, Dof3Action> {
        &self.dof3
    }

    pub fn dof3_bindings_mut(&mut self) -> &mut Bindings<ButtonShortcut, Dof3Action> {
        &mut self.dof3
    }

    pub fn dof6_bindings(&self) -> &Bindings<ButtonShortcut, Dof6Action> {
        &self.dof6
    }

    pub fn dof6_bindings_mut(&mut self) -> &mut Bindings<ButtonShortcut, Dof6Action> {
        &mut self.dof6
    }

    pub fn selection_action(&self) -> Option<GlobalAction> {
        self.selection_action
    }

    pub fn set_selection_action(&mut self, action: Option<GlobalAction>) {
        self.selection_action = action;
    }

    pub fn deselection_action(&self) -> Option<GlobalAction> {
        self.deselection_action
    }

    pub fn set_deselection_action(&mut self, action: Option<GlobalAction>) {
        self.deselection_action = action;
    }

    /// Binds `shortcut` to `action` in the table of the action's family.
    ///
    /// Returns the action the shortcut was bound to before, if any.
    pub fn bind(
        &mut self,
        shortcut: impl Into<Shortcut>,
        action: impl Into<Action>,
    ) -> Result<Option<Action>, BindingError> {
        let shortcut = shortcut.into();
        let action = action.into();
        debug!(%shortcut, %action, "binding shortcut");

        let previous = match (shortcut, action) {
            (Shortcut::Click(s), Action::Click(a)) => self.click.bind(s, a).map(Action::from),
            (Shortcut::Keyboard(s), Action::Keyboard(a)) => {
                self.keyboard.bind(s, a).map(Action::from)
            }
            (Shortcut::Button(s), Action::Dof1(a)) => self.dof1.bind(s, a).map(Action::from),
            (Shortcut::Button(s), Action::Dof2(a)) => self.dof2.bind(s, a).map(Action::from),
            (Shortcut::Button(s), Action::Dof3(a)) => self.dof3.bind(s, a).map(Action::from),
            (Shortcut::Button(s), Action::Dof6(a)) => self.dof6.bind(s, a).map(Action::from),
            (shortcut, action) => {
                return Err(BindingError::ShortcutMismatch {
                    shortcut: shortcut.family(),
                    action: action.kind(),
                });
            }
        };
        Ok(previous)
    }

    /// Same as [`Profile::bind`], reading the shortcut from its textual form.
    ///
    /// ```
    /// # use frame_interaction::prelude::*;
    /// let mut profile = Profile::new();
    /// profile.bind_str("CTRL+LEFT", Dof2Action::ScreenRotate).unwrap();
    /// profile.bind_str("RIGHT*2", ClickAction::CenterFrame).unwrap();
    /// assert!(profile.bind_str("CTRL+", KeyboardAction::Select).is_err());
    /// ```
    pub fn bind_str(
        &mut self,
        shortcut: &str,
        action: impl Into<Action>,
    ) -> Result<Option<Action>, BindingError> {
        let action = action.into();
        let shortcut: Shortcut = match action.kind() {
            EventKind::Click => shortcut.parse::<ClickShortcut>()?.into(),
            EventKind::Keyboard => shortcut.parse::<KeyboardShortcut>()?.into(),
            EventKind::Dof1 | EventKind::Dof2 | EventKind::Dof3 | EventKind::Dof6 => {
                shortcut.parse::<ButtonShortcut>()?.into()
            }
        };
        self.bind(shortcut, action)
    }

    /// Unbinds `shortcut` from every table it may appear in.
    ///
    /// Returns true if any binding was removed.
    pub fn unbind(&mut self, shortcut: impl Into<Shortcut>) -> bool {
        match shortcut.into() {
            Shortcut::Click(s) => self.click.unbind(&s).is_some(),
            Shortcut::Keyboard(s) => self.keyboard.unbind(&s).is_some(),
            Shortcut::Button(s) => {
                let removed = [
                    self.dof1.unbind(&s).is_some(),
                    self.dof2.unbind(&s).is_some(),
                    self.dof3.unbind(&s).is_some(),
                    self.dof6.unbind(&s).is_some(),
                ];
                removed.contains(&true)
            }
        }
    }

    /// Unbinds every shortcut bound to `action`. Returns how many were removed.
    pub fn remove_action(&mut self, action: impl Into<Action>) -> usize {
        match action.into() {
            Action::Click(a) => self.click.remove_action(a),
            Action::Keyboard(a) => self.keyboard.remove_action(a),
            Action::Dof1(a) => self.dof1.remove_action(a),
            Action::Dof2(a) => self.dof2.remove_action(a),
            Action::Dof3(a) => self.dof3.remove_action(a),
            Action::Dof6(a) => self.dof6.remove_action(a),
        }
    }

    pub fn is_bound(&self, shortcut: impl Into<Shortcut>) -> bool {
        match shortcut.into() {
            Shortcut::Click(s) => self.click.is_bound(&s),
            Shortcut::Keyboard(s) => self.keyboard.is_bound(&s),
            Shortcut::Button(s) => {
                self.dof1.is_bound(&s)
                    || self.dof2.is_bound(&s)
                    || self.dof3.is_bound(&s)
                    || self.dof6.is_bound(&s)
            }
        }
    }

    /// Removes every binding. Selection actions are kept.
    pub fn clear(&mut self) {
        self.click.clear();
        self.keyboard.clear();
        self.dof1.clear();
        self.dof2.clear();
        self.dof3.clear();
        self.dof6.clear();
    }

    /// The action bound to the shortcut of `event`, in the table of the event family.
    pub fn resolve(&self, event: &Event) -> Option<Action> {
        match event {
            Event::Click(e) => self.click.action(&e.click_shortcut()).map(Action::from),
            Event::Keyboard(e) => self.keyboard.action(&e.keyboard_shortcut()).map(Action::from),
            Event::Dof1(e) => self.dof1.action(&e.button_shortcut()).map(Action::from),
            Event::Dof2(e) => self.dof2.action(&e.button_shortcut()).map(Action::from),
            Event::Dof3(e) => self.dof3.action(&e.button_shortcut()).map(Action::from),
            Event::Dof6(e) => self.dof6.action(&e.button_shortcut()).map(Action::from),
        }
    }

    /// Resolves the action of `event` and attaches it, replacing any previous one.
    pub fn attach(&self, event: &mut Event) -> Option<Action> {
        match event {
            Event::Click(e) => e.set_action(self.click.action(&e.click_shortcut())),
            Event::Keyboard(e) => e.set_action(self.keyboard.action(&e.keyboard_shortcut())),
            Event::Dof1(e) => e.set_action(self.dof1.action(&e.button_shortcut())),
            Event::Dof2(e) => e.set_action(self.dof2.action(&e.button_shortcut())),
            Event::Dof3(e) => e.set_action(self.dof3.action(&e.button_shortcut())),
            Event::Dof6(e) => e.set_action(self.dof6.action(&e.button_shortcut())),
        }
        event.action()
    }

    fn describe<K: fmt::Display, A: Actionable>(
        f: &mut fmt::Formatter<'_>,
        title: &str,
        bindings: impl Iterator<Item = (K, A)>,
    ) -> fmt::Result {
        let mut lines: Vec<String> = bindings
            .map(|(shortcut, action)| {
                format!(
                    "  {shortcut} -> {} ({})",
                    action.global(),
                    action.description()
                )
            })
            .collect();
        if lines.is_empty() {
            return Ok(());
        }
        lines.sort();

        writeln!(f, "{title} bindings:")?;
        for line in lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::describe(f, "Click", self.click.iter().map(|(s, a)| (*s, *a)))?;
        Self::describe(f, "Keyboard", self.keyboard.iter().map(|(s, a)| (*s, *a)))?;
        Self::describe(f, "Wheel", self.dof1.iter().map(|(s, a)| (*s, *a)))?;
        Self::describe(f, "Pointer", self.dof2.iter().map(|(s, a)| (*s, *a)))?;
        Self::describe(f, "3-DOF", self.dof3.iter().map(|(s, a)| (*s, *a)))?;
        Self::describe(f, "6-DOF", self.dof6.iter().map(|(s, a)| (*s, *a)))?;
        if let Some(action) = self.selection_action {
            writeln!(f, "Selection action: {action}")?;
        }
        if let Some(action) = self.deselection_action {
            writeln!(f, "Deselection action: {action}")?;
        }
        Ok(())
    }
}
