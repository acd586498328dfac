//! Armed long-press deadline.
//!
//! The engine is cooperatively driven, so the "timer" is a recorded deadline
//! checked against event timestamps and explicit polls rather than a
//! scheduled callback. Every path that invalidates the pending long press
//! must call [`LongPressTimer::cancel`] explicitly; a host that never
//! advances time simply never fires it.

#[derive(Debug, Default)]
pub struct LongPressTimer {
    deadline_ms: Option<u64>,
}

impl LongPressTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, start_ms: u64, long_press_ms: u64) {
        self.deadline_ms = Some(start_ms.saturating_add(long_press_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Consumes the deadline when `now_ms` has reached it, so a long press
    /// fires at most once per arming.
    pub fn fire_if_due(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
