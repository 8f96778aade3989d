/// The default rotation applied per pixel of pointer motion, in radians
pub const DEFAULT_ROTATION_SENSITIVITY: f64 = std::f64::consts::PI / 360.0;
/// The default translation applied per pixel of pointer motion, in world units
pub const DEFAULT_TRANSLATION_SENSITIVITY: f64 = 0.01;
/// The default relative scaling applied per unit of motion
pub const DEFAULT_SCALING_SENSITIVITY: f64 = 0.01;
/// The default multiplier of wheel motion
pub const DEFAULT_WHEEL_SENSITIVITY: f64 = 10.0;
/// The default distance, in pixels, within which the pointer grabs a frame
pub const DEFAULT_GRABS_INPUT_THRESHOLD: f64 = 20.0;
/// The default share of the spinning rotation lost at every spin step
pub const DEFAULT_SPINNING_DAMPING: f64 = 0.1;

/// Configuration of an interactive frame.
///
/// Defines how much the frame moves in response to input, and when it
/// claims the pointer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InteractionConfig {
    /// Radians of rotation per unit of motion.
    pub rotation_sensitivity: f64,
    /// World units of translation per unit of motion.
    pub translation_sensitivity: f64,
    /// Relative scaling per unit of motion.
    pub scaling_sensitivity: f64,
    /// Multiplier applied to 1-DOF (wheel) motion before any other sensitivity.
    pub wheel_sensitivity: f64,
    /// Pointer distance to the projected frame position under which the frame grabs the input.
    pub grabs_input_threshold: f64,
    /// Share of the angle lost at every spin step, in `[0, 1]`.
    pub spinning_damping: f64,
    /// Whether the scene is 2D. Actions needing a third dimension are then ignored.
    pub two_dimensional: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            rotation_sensitivity: DEFAULT_ROTATION_SENSITIVITY,
            translation_sensitivity: DEFAULT_TRANSLATION_SENSITIVITY,
            scaling_sensitivity: DEFAULT_SCALING_SENSITIVITY,
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            grabs_input_threshold: DEFAULT_GRABS_INPUT_THRESHOLD,
            spinning_damping: DEFAULT_SPINNING_DAMPING,
            two_dimensional: false,
        }
    }
}

impl InteractionConfig {
    /// Default configuration of a 2D scene.
    pub fn two_dimensional() -> Self {
        Self {
            two_dimensional: true,
            ..Self::default()
        }
    }
}
