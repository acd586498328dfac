//! Tap qualification and double-tap pairing.

use crate::config::GestureConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapDecision {
    Tap,
    DoubleTap,
    NotATap,
}

/// Remembers the previous qualifying tap so a second one inside the window
/// is reported as a double-tap instead of another single tap.
///
/// A single tap is committed immediately on release; the double-tap is a
/// replacement for the second release, never an addition to it. Pairing is
/// consumed on a double-tap so a third rapid tap starts a fresh pair.
#[derive(Debug, Default)]
pub struct TapDisambiguator {
    last_tap_ms: Option<u64>,
}

impl TapDisambiguator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_release(
        &mut self,
        movement_px: f32,
        duration_ms: u64,
        now_ms: u64,
        config: &GestureConfig,
    ) -> TapDecision {
        if movement_px > config.movement_tolerance_px || duration_ms > config.tap_max_ms {
            return TapDecision::NotATap;
        }
        match self.last_tap_ms {
            Some(previous_ms)
                if now_ms.saturating_sub(previous_ms) < config.double_tap_window_ms =>
            {
                self.last_tap_ms = None;
                TapDecision::DoubleTap
            }
            _ => {
                self.last_tap_ms = Some(now_ms);
                TapDecision::Tap
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_tap_ms = None;
    }
}
