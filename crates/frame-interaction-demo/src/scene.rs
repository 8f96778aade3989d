use std::cell::RefCell;
use std::rc::Rc;

use frame_interaction::prelude::*;

const VIEWPORT: DVec2 = DVec2::new(1280.0, 800.0);
const PIXELS_PER_UNIT: f64 = 100.0;

/// A camera looking down -Z at a row of cubes, with an orthographic projection.
pub struct Scene {
    pub camera: SharedFrame,
    pub cubes: Vec<Rc<RefCell<InteractiveFrame>>>,
}

impl Scene {
    pub fn new(cube_count: usize) -> Self {
        let camera = Frame::new().shared();
        camera
            .borrow_mut()
            .set_translation(DVec3::new(0.0, 0.0, 10.0));

        let cubes = (0..cube_count)
            .map(|i| {
                let x = -((cube_count / 2) as f64) * 1.5 + i as f64 * 1.5;
                let mut frame = Frame::new();
                frame.set_translation(DVec3::new(x, 1.0, 0.0));

                // The middle cube may only slide along the camera X axis.
                if i == cube_count / 2 {
                    frame.set_constraint(
                        AxisPlaneConstraint::camera(camera.clone())
                            .with_translation(AxisPlane::axis(DVec3::X))
                            .with_rotation(AxisPlane::Forbidden),
                    );
                }

                InteractiveFrame::new(frame)
                    .with_camera(camera.clone())
                    .shared()
            })
            .collect();

        let scene = Self { camera, cubes };
        scene.project();
        scene
    }

    /// Updates the screen position of every cube.
    pub fn project(&self) {
        let camera = self.camera.borrow();
        for cube in &self.cubes {
            let mut cube = cube.borrow_mut();
            let eye = camera.coordinates_of(cube.frame().position());
            let screen = VIEWPORT / 2.0 + DVec2::new(eye.x, -eye.y) * PIXELS_PER_UNIT;
            cube.set_screen_position(screen);
        }
    }

    pub fn screen_position(&self, cube: usize) -> DVec2 {
        self.cubes[cube]
            .borrow()
            .screen_position()
            .unwrap_or(VIEWPORT / 2.0)
    }
}
