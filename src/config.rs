//! Engine thresholds. All defaults are usable with zero configuration.

const MOVEMENT_TOLERANCE_PX: f32 = 10.0;
const LONG_PRESS_MS: u64 = 500;
const TAP_MAX_MS: u64 = 200;
const DOUBLE_TAP_WINDOW_MS: u64 = 300;
const SWIPE_MIN_DISTANCE_PX: f32 = 60.0;
const SWIPE_MIN_VELOCITY_PX_MS: f32 = 0.5;
const SWIPE_MAX_DURATION_MS: u64 = 500;
const PINCH_SCALE_SENSITIVITY: f32 = 0.01;
const HAPTIC_PULSE_MS: u64 = 10;

/// Immutable per-engine configuration.
///
/// The movement tolerance bounds both long-press cancellation and tap
/// qualification. The tap ceiling is deliberately shorter than the swipe
/// window: a slow stationary release is neither.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    pub movement_tolerance_px: f32,
    pub long_press_ms: u64,
    pub tap_max_ms: u64,
    pub double_tap_window_ms: u64,
    pub swipe_min_distance_px: f32,
    pub swipe_min_velocity_px_ms: f32,
    pub swipe_max_duration_ms: u64,
    pub pinch_scale_sensitivity: f32,
    /// Requested pulse length for the best-effort haptic hook.
    pub haptic_pulse_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            movement_tolerance_px: MOVEMENT_TOLERANCE_PX,
            long_press_ms: LONG_PRESS_MS,
            tap_max_ms: TAP_MAX_MS,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            swipe_min_distance_px: SWIPE_MIN_DISTANCE_PX,
            swipe_min_velocity_px_ms: SWIPE_MIN_VELOCITY_PX_MS,
            swipe_max_duration_ms: SWIPE_MAX_DURATION_MS,
            pinch_scale_sensitivity: PINCH_SCALE_SENSITIVITY,
            haptic_pulse_ms: HAPTIC_PULSE_MS,
        }
    }
}
