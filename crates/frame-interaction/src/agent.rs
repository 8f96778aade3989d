use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::action::Actionable;
use crate::event::{Event, InputEvent};
use crate::handler::{EventGrabberTuple, InputHandler};
use crate::profile::Profile;

/// Something an agent can route events to, typically an interactive frame.
pub trait Grabbable {
    /// Updates whether the object claims the input, given `event`.
    fn check_if_grabs_input(&mut self, event: &Event);
    /// Verdict of the latest [`Grabbable::check_if_grabs_input`] call.
    fn grabs_input(&self) -> bool;
    /// Performs the action attached to `event`.
    fn perform_interaction(&mut self, event: &Event);
}

/// Shared handle on a grabbable object.
pub type GrabberHandle = Rc<RefCell<dyn Grabbable>>;

/// Identity of an [`Agent`], unique within the process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u64);

impl AgentId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Turns raw events of one device into tuples addressed to the grabbable
/// object that currently has the device focus.
///
/// The focused object (the *grabber*) is picked among the agent pool by
/// [`Agent::update_grabber`]. It can also be locked with
/// [`Agent::enforce_grabber`], in which case no further picking happens until
/// [`Agent::unset_grabber`].
pub struct Agent {
    id: AgentId,
    name: String,
    profile: Profile,
    pool: Vec<GrabberHandle>,
    grabber: Option<GrabberHandle>,
    enforced: bool,
    default_grabber: Option<GrabberHandle>,
}

fn same(a: &GrabberHandle, b: &GrabberHandle) -> bool {
    Rc::ptr_eq(a, b)
}

fn same_option(a: Option<&GrabberHandle>, b: Option<&GrabberHandle>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl Agent {
    /// Creates an agent with a fresh [`AgentId`]. `name` is only used for display.
    pub fn new(name: impl Into<String>, profile: Profile) -> Self {
        Self {
            id: AgentId::next(),
            name: name.into(),
            profile,
            pool: Vec::new(),
            grabber: None,
            enforced: false,
            default_grabber: None,
        }
    }

    /// Identity under which the agent registers in an [`InputHandler`].
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    /// Adds `grabbable` at the end of the pool. Returns false if it is already there.
    pub fn add_in_pool(&mut self, grabbable: GrabberHandle) -> bool {
        if self.is_in_pool(&grabbable) {
            return false;
        }
        self.pool.push(grabbable);
        true
    }

    /// Removes `grabbable` from the pool, dropping the focus and the default
    /// grabber if it held them.
    pub fn remove_from_pool(&mut self, grabbable: &GrabberHandle) -> bool {
        let Some(index) = self.pool.iter().position(|g| same(g, grabbable)) else {
            return false;
        };
        self.pool.remove(index);
        if self.grabber.as_ref().is_some_and(|g| same(g, grabbable)) {
            self.grabber = None;
        }
        if self.default_grabber.as_ref().is_some_and(|g| same(g, grabbable)) {
            self.default_grabber = None;
        }
        true
    }

    pub fn is_in_pool(&self, grabbable: &GrabberHandle) -> bool {
        self.pool.iter().any(|g| same(g, grabbable))
    }

    pub fn pool(&self) -> &[GrabberHandle] {
        &self.pool
    }

    /// Empties the pool. The focus and the default grabber are dropped too.
    pub fn clear_pool(&mut self) {
        self.pool.clear();
        self.grabber = None;
        self.default_grabber = None;
    }

    /// The pool member holding the focus, if any.
    pub fn grabber(&self) -> Option<&GrabberHandle> {
        self.grabber.as_ref()
    }

    pub fn is_grabber(&self, grabbable: &GrabberHandle) -> bool {
        self.grabber.as_ref().is_some_and(|g| same(g, grabbable))
    }

    pub fn is_grabber_enforced(&self) -> bool {
        self.enforced
    }

    /// Grabber receiving the tuples while no pool member holds the focus.
    pub fn default_grabber(&self) -> Option<&GrabberHandle> {
        self.default_grabber.as_ref()
    }

    /// Sets the default grabber. Returns false if `grabbable` is not in the pool.
    pub fn set_default_grabber(&mut self, grabbable: Option<&GrabberHandle>) -> bool {
        if let Some(grabbable) = grabbable {
            if !self.is_in_pool(grabbable) {
                return false;
            }
        }
        self.default_grabber = grabbable.cloned();
        true
    }

    /// Picks the grabber for `event`.
    ///
    /// Does nothing unless the agent is registered in `handler` and its
    /// grabber is not enforced. The selection and deselection actions of the
    /// profile are intercepted: the former picks a new grabber and lets the
    /// event through, the latter drops the grabber and consumes the event.
    /// Agents without such actions pick a grabber on every event.
    ///
    /// Returns true when the event was consumed.
    pub fn update_grabber(&mut self, event: &Event, handler: &InputHandler) -> bool {
        if !handler.is_agent_registered(self) || self.enforced {
            return false;
        }

        let selection = self.profile.selection_action();
        let deselection = self.profile.deselection_action();
        if selection.is_none() && deselection.is_none() {
            self.pick_grabber(event);
            return false;
        }

        let action = event
            .action()
            .or_else(|| self.profile.resolve(event))
            .map(|action| action.global());
        match action {
            Some(action) if Some(action) == selection => {
                self.pick_grabber(event);
                false
            }
            Some(action) if Some(action) == deselection => {
                self.set_grabber(None);
                true
            }
            _ => false,
        }
    }

    /// Scans the whole pool, in insertion order. The last member grabbing the input wins.
    fn pick_grabber(&mut self, event: &Event) {
        let mut picked = None;
        for grabbable in &self.pool {
            let mut candidate = grabbable.borrow_mut();
            candidate.check_if_grabs_input(event);
            if candidate.grabs_input() {
                picked = Some(grabbable.clone());
            }
        }
        self.set_grabber(picked);
    }

    fn set_grabber(&mut self, grabber: Option<GrabberHandle>) {
        if !same_option(self.grabber.as_ref(), grabber.as_ref()) {
            debug!(
                agent = %self.name,
                grabbed = grabber.is_some(),
                "grabber changed"
            );
        }
        self.grabber = grabber;
    }

    /// Routes `event` to the current grabber.
    ///
    /// Unless [`Agent::update_grabber`] consumes it, the profile resolves the
    /// event action, attaches it and the event is enqueued in `handler`
    /// together with the grabber (or the default grabber). Events of
    /// unregistered agents are dropped.
    ///
    /// Returns true when a tuple was enqueued.
    pub fn handle(&mut self, mut event: Event, handler: &mut InputHandler) -> bool {
        if self.update_grabber(&event, handler) {
            return false;
        }
        if !handler.is_agent_registered(self) {
            return false;
        }

        let action = self.profile.attach(&mut event);
        let grabber = self
            .grabber
            .clone()
            .or_else(|| self.default_grabber.clone());
        debug!(
            agent = %self.name,
            kind = %event.kind(),
            action = ?action.map(|action| action.global()),
            grabbed = grabber.is_some(),
            "event handled"
        );
        handler.enqueue(EventGrabberTuple::new(event, grabber));
        true
    }

    /// Locks the focus on `grabber`, or on no grabber at all for `None`.
    ///
    /// Returns false if the focus is already enforced or `grabber` is not in the pool.
    pub fn enforce_grabber(&mut self, grabber: Option<&GrabberHandle>) -> bool {
        if self.enforced {
            return false;
        }
        if let Some(grabber) = grabber {
            if !self.is_in_pool(grabber) {
                return false;
            }
        }
        self.set_grabber(grabber.cloned());
        self.enforced = true;
        true
    }

    /// Drops the focus and lifts any enforcement.
    pub fn unset_grabber(&mut self) {
        self.set_grabber(None);
        self.enforced = false;
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("profile", &self.profile)
            .field("pool", &self.pool.len())
            .field("grabber", &self.grabber.as_ref().map(Rc::as_ptr))
            .field("enforced", &self.enforced)
            .finish_non_exhaustive()
    }
}
