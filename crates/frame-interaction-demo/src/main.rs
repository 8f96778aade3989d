use frame_interaction::prelude::*;
use scene::Scene;
use tracing::{info, trace};

mod scene;

const FRAME_RATE: f64 = 60.0;
const SESSION_FRAMES: u64 = 240;

/// Scripted device input for one host frame.
enum Input {
    Pointer(Dof2Event),
    Wheel(Dof1Event),
    Click(ClickEvent),
    Key(KeyboardEvent),
    Navigator(Dof6Event),
}

/// A headless session: a pointer drags the cubes around, the wheel scales
/// one of them, the keyboard selects and recenters another and a space
/// navigator flies the selection, all in sync with a 60 Hz host loop.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,frame_interaction=debug".into()),
        )
        .init();

    let scene = Scene::new(3);
    let clock = ManualClock::new(FRAME_RATE);
    let mut timers = TimerPool::new(clock.clone());
    let mut handler = InputHandler::new();

    let mut mouse = Agent::new("mouse", Profile::mouse());
    let mut keyboard = Agent::new("keyboard", Profile::keyboard());
    let mut navigator = Agent::new("navigator", Profile::six_dof());
    for agent in [&mouse, &keyboard, &navigator] {
        handler.register_agent(agent);
    }
    for cube in &scene.cubes {
        mouse.add_in_pool(cube.clone());
        keyboard.add_in_pool(cube.clone());
        navigator.add_in_pool(cube.clone());
    }
    info!("{}", mouse.profile());

    let spinning = scene.cubes[0].clone();
    spinning
        .borrow_mut()
        .start_spinning(DQuat::from_rotation_y(0.05));
    let spin = InteractiveFrame::spin_with_timer(&spinning, &mut timers, "spin", 40);

    let mut pointer = Dof2Event::new(Modifiers::empty(), None, [0.0, 0.0]);
    for frame in 0..SESSION_FRAMES {
        clock.advance(clock.frame_millis());
        let now = clock.now_millis();

        for input in script(frame, &scene, &mut pointer, now) {
            match input {
                Input::Pointer(event) => mouse.handle(event.into(), &mut handler),
                Input::Wheel(event) => mouse.handle(event.into(), &mut handler),
                Input::Click(event) => mouse.handle(event.into(), &mut handler),
                Input::Key(event) => keyboard.handle(event.into(), &mut handler),
                Input::Navigator(event) => navigator.handle(event.into(), &mut handler),
            };
        }

        let performed = handler.handle();
        let fired = timers.handle();
        if performed + fired > 0 {
            trace!(frame, performed, fired, "host frame");
        }
        scene.project();

        if frame == SESSION_FRAMES / 2 {
            timers.stop(spin);
            info!(frame, "spinning stopped");
        }
    }

    for (i, cube) in scene.cubes.iter().enumerate() {
        let cube = cube.borrow();
        let frame = cube.frame();
        info!(
            cube = i,
            translation = ?frame.translation(),
            rotation = ?frame.rotation(),
            scaling = ?frame.scaling(),
            "final pose"
        );
    }
}

/// The input of host `frame`, generated at `now` milliseconds.
fn script(frame: u64, scene: &Scene, pointer: &mut Dof2Event, now: u64) -> Vec<Input> {
    let mut move_pointer = |modifiers: Modifiers, button: Option<Button>, to: DVec2| {
        let event =
            Dof2Event::relative(&*pointer, modifiers, button, [to.x, to.y]).with_timestamp(now);
        *pointer = event;
        Input::Pointer(event)
    };

    match frame {
        // Hover the left cube, then drag it to the right with the right button.
        0 => vec![move_pointer(Modifiers::empty(), None, scene.screen_position(0))],
        1..=30 => {
            let start = scene.screen_position(0);
            let to = DVec2::new(start.x + 4.0, start.y);
            vec![move_pointer(Modifiers::empty(), Some(Button::Right), to)]
        }
        // Try to drag the constrained middle cube diagonally: only X survives.
        31 => vec![move_pointer(Modifiers::empty(), None, scene.screen_position(1))],
        32..=60 => {
            let start = scene.screen_position(1);
            let to = DVec2::new(start.x + 3.0, start.y + 3.0);
            vec![move_pointer(Modifiers::empty(), Some(Button::Right), to)]
        }
        // Scale the right cube with the wheel, then double click to align it.
        61 => vec![move_pointer(Modifiers::empty(), None, scene.screen_position(2))],
        62..=70 => vec![Input::Wheel(
            Dof1Event::new(Modifiers::empty(), None, [1.0]).with_timestamp(now),
        )],
        71..=80 => {
            let at = scene.screen_position(2);
            vec![move_pointer(
                Modifiers::empty(),
                Some(Button::Left),
                DVec2::new(at.x, at.y - 2.0),
            )]
        }
        81 => vec![Input::Click(
            ClickEvent::new(Modifiers::empty(), Button::Left, 2).with_timestamp(now),
        )],
        // Select the hovered cube from the keyboard and recenter it.
        90 => vec![Input::Key(
            KeyboardEvent::new(Modifiers::empty(), Key::ENTER).with_timestamp(now),
        )],
        91 => vec![Input::Key(
            KeyboardEvent::new(Modifiers::empty(), Key::Char('c')).with_timestamp(now),
        )],
        // Fly it with the navigator while hovering it.
        100..=160 => vec![Input::Navigator(
            Dof6Event::new(Modifiers::empty(), None, [0.5, 0.0, -0.2, 0.0, 1.0, 0.0])
                .with_timestamp(now),
        )],
        161 => vec![Input::Key(
            KeyboardEvent::new(Modifiers::empty(), Key::ESCAPE).with_timestamp(now),
        )],
        _ => Vec::new(),
    }
}
