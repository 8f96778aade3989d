//! Device-agnostic interaction with 3D and 2D frames.
//!
//! Raw device input is described by [`Event`]s typed by the number of degrees
//! of freedom (DOF) they carry: clicks, key strokes, wheels (1 DOF), pointers
//! (2 DOF) and 3 or 6 DOF devices. An [`Agent`] per device resolves the
//! [`Shortcut`] of every event to an [`Action`] through its [`Profile`],
//! attaches the action to the event and queues it, together with the
//! [`Grabbable`] object holding the device focus, in an [`InputHandler`].
//!
//! Draining the handler lets the grabbers perform the actions. An
//! [`InteractiveFrame`] turns them into translations, rotations and scalings
//! of its [`Frame`], which are first filtered by the frame [`Constraint`],
//! e.g. an [`AxisPlaneConstraint`] restricting translations to an axis of the
//! world, of the frame itself or of the camera.
//!
//! A [`TimerPool`] runs periodic and one-shot tasks in sync with the host
//! frame rate, for instance to keep a frame spinning.
//!
//! # Usage
//!
//! ```
//! use frame_interaction::prelude::*;
//!
//! let mut handler = InputHandler::new();
//! let mut mouse = Agent::new("mouse", Profile::mouse());
//! handler.register_agent(&mouse);
//!
//! let frame = InteractiveFrame::new(Frame::new()).shared();
//! frame.borrow_mut().set_screen_position(DVec2::new(320.0, 240.0));
//! mouse.add_in_pool(frame.clone());
//!
//! let press = Dof2Event::new(Modifiers::empty(), Some(Button::Right), [320.0, 240.0]);
//! mouse.handle(press.next([330.0, 240.0]).into(), &mut handler);
//! assert_eq!(handler.handle(), 1);
//! assert!(frame.borrow().frame().translation().x > 0.0);
//! ```

pub mod action;
pub mod agent;
pub mod config;
pub mod constraint;
pub mod error;
pub mod event;
pub mod frame;
pub mod handler;
pub mod interactive;
pub mod math;
pub mod profile;
pub mod shortcut;
pub mod timer;

pub mod prelude;

pub use prelude::*;
