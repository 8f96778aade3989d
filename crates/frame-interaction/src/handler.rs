use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, trace};

use crate::agent::{Agent, AgentId, GrabberHandle};
use crate::event::{Event, InputEvent};

/// An event together with the grabber it is addressed to.
pub struct EventGrabberTuple {
    event: Event,
    grabber: Option<GrabberHandle>,
}

impl EventGrabberTuple {
    pub fn new(event: Event, grabber: Option<GrabberHandle>) -> Self {
        Self { event, grabber }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn grabber(&self) -> Option<&GrabberHandle> {
        self.grabber.as_ref()
    }

    pub fn into_parts(self) -> (Event, Option<GrabberHandle>) {
        (self.event, self.grabber)
    }

    /// Lets the grabber perform the event action.
    ///
    /// Returns false when the tuple has no grabber.
    pub fn perform(self) -> bool {
        match self.grabber {
            Some(grabber) => {
                grabber.borrow_mut().perform_interaction(&self.event);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for EventGrabberTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventGrabberTuple")
            .field("event", &self.event)
            .field("grabber", &self.grabber.as_ref().map(Rc::as_ptr))
            .finish()
    }
}

/// Registry of agents and FIFO queue of the tuples they produce.
///
/// Agents are registered by [`AgentId`], so two agents sharing a name are
/// still told apart.
///
/// The host drains the queue once per frame with [`InputHandler::handle`].
#[derive(Debug, Default)]
pub struct InputHandler {
    agents: AHashMap<AgentId, String>,
    queue: VecDeque<EventGrabberTuple>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `agent`. Returns false if it was already registered.
    pub fn register_agent(&mut self, agent: &Agent) -> bool {
        if self.agents.contains_key(&agent.id()) {
            return false;
        }
        self.agents.insert(agent.id(), agent.name().to_owned());
        debug!(agent = agent.name(), id = %agent.id(), "agent registered");
        true
    }

    pub fn unregister_agent(&mut self, agent: &Agent) -> bool {
        let removed = self.agents.remove(&agent.id()).is_some();
        if removed {
            debug!(agent = agent.name(), id = %agent.id(), "agent unregistered");
        }
        removed
    }

    pub fn is_agent_registered(&self, agent: &Agent) -> bool {
        self.agents.contains_key(&agent.id())
    }

    /// Names of the registered agents, in no particular order.
    pub fn registered_agents(&self) -> impl Iterator<Item = &str> {
        self.agents.values().map(String::as_str)
    }

    pub fn enqueue(&mut self, tuple: EventGrabberTuple) {
        trace!(kind = %tuple.event().kind(), "tuple enqueued");
        self.queue.push_back(tuple);
    }

    /// Removes the oldest pending tuple.
    pub fn next_tuple(&mut self) -> Option<EventGrabberTuple> {
        self.queue.pop_front()
    }

    /// Performs every pending tuple, in the order they were enqueued.
    ///
    /// Returns how many tuples reached a grabber.
    pub fn handle(&mut self) -> usize {
        let mut performed = 0;
        while let Some(tuple) = self.queue.pop_front() {
            if tuple.perform() {
                performed += 1;
            }
        }
        performed
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops every pending tuple.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::action::{Action, Actionable, ClickAction, GlobalAction, KeyboardAction};
    use crate::agent::Grabbable;
    use crate::event::{ClickEvent, KeyboardEvent};
    use crate::profile::Profile;
    use crate::shortcut::{Button, Key, Modifiers};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        performed: Vec<Option<GlobalAction>>,
    }

    impl Grabbable for Recorder {
        fn check_if_grabs_input(&mut self, _event: &Event) {}

        fn grabs_input(&self) -> bool {
            true
        }

        fn perform_interaction(&mut self, event: &Event) {
            self.performed.push(event.action().map(|action| action.global()));
        }
    }

    #[test]
    fn tuples_are_performed_in_fifo_order() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let handle: GrabberHandle = recorder.clone();
        let mut handler = InputHandler::new();

        let click = ClickEvent::new(Modifiers::empty(), Button::Left, 2)
            .with_action(ClickAction::AlignFrame);
        let key = KeyboardEvent::new(Modifiers::empty(), Key::Char('c'))
            .with_action(KeyboardAction::CenterFrame);
        handler.enqueue(EventGrabberTuple::new(click.into(), Some(handle.clone())));
        handler.enqueue(EventGrabberTuple::new(key.into(), Some(handle)));
        handler.enqueue(EventGrabberTuple::new(key.into(), None));
        assert_eq!(handler.queue_len(), 3);

        assert_eq!(handler.handle(), 2);
        assert!(handler.is_queue_empty());
        assert_eq!(
            recorder.borrow().performed,
            vec![Some(GlobalAction::AlignFrame), Some(GlobalAction::CenterFrame)]
        );
    }

    #[test]
    fn next_tuple_pops_the_oldest() {
        let mut handler = InputHandler::new();
        let first = ClickEvent::new(Modifiers::empty(), Button::Left, 1).with_timestamp(1);
        let second = ClickEvent::new(Modifiers::empty(), Button::Left, 1).with_timestamp(2);
        handler.enqueue(EventGrabberTuple::new(first.into(), None));
        handler.enqueue(EventGrabberTuple::new(second.into(), None));

        let tuple = handler.next_tuple().unwrap();
        assert_eq!(tuple.event().timestamp(), 1);
        assert!(tuple.grabber().is_none());
        let (event, _) = handler.next_tuple().unwrap().into_parts();
        assert_eq!(event.action(), None::<Action>);
        assert!(handler.next_tuple().is_none());
    }

    #[test]
    fn agents_register_once() {
        let agent = Agent::new("mouse", Profile::mouse());
        let mut handler = InputHandler::new();
        assert!(handler.register_agent(&agent));
        assert!(!handler.register_agent(&agent));
        assert!(handler.is_agent_registered(&agent));
        assert_eq!(handler.registered_agents().collect::<Vec<_>>(), vec!["mouse"]);

        assert!(handler.unregister_agent(&agent));
        assert!(!handler.is_agent_registered(&agent));
    }

    #[test]
    fn agents_sharing_a_name_are_distinct() {
        let registered = Agent::new("mouse", Profile::mouse());
        let mut other = Agent::new("mouse", Profile::mouse());
        assert_ne!(registered.id(), other.id());

        let mut handler = InputHandler::new();
        assert!(handler.register_agent(&registered));
        assert!(!handler.is_agent_registered(&other));

        let recorder = Rc::new(RefCell::new(Recorder::default()));
        other.add_in_pool(recorder.clone());
        let click = ClickEvent::new(Modifiers::empty(), Button::Left, 2);
        assert!(!other.handle(click.into(), &mut handler));
        assert!(handler.is_queue_empty());

        assert!(handler.register_agent(&other));
        assert_eq!(handler.registered_agents().count(), 2);
        assert!(handler.unregister_agent(&registered));
        assert!(handler.is_agent_registered(&other));
    }
}
