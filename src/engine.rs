//! Gesture engine: event routing, mutual exclusion between gesture
//! families, and the public callback-registration surface.

use statig::blocking::IntoStateMachineExt as _;

use crate::config::GestureConfig;
use crate::events::{
    GestureEvent, LongPressDetails, PointerEvent, SwipeDetails, SwipeDirection,
};

mod hsm;

use hsm::GestureHsm;

/// Upper bound on gestures recognized from a single input event.
const MAX_EVENTS_PER_INPUT: usize = 4;

/// Collects the gestures recognized while one input is routed through the
/// state machine.
#[derive(Debug, Default)]
pub(crate) struct DispatchContext {
    events: heapless::Vec<GestureEvent, MAX_EVENTS_PER_INPUT>,
}

impl DispatchContext {
    pub(crate) fn emit(&mut self, event: GestureEvent) {
        let _ = self.events.push(event);
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum EngineHsmEvent {
    Pointer(PointerEvent),
    TimerDue { now_ms: u64 },
}

type PositionHandler = Box<dyn FnMut(f32, f32)>;
type PlainHandler = Box<dyn FnMut()>;
type LongPressHandler = Box<dyn FnMut(f32, f32, LongPressDetails)>;
type SwipeHandler = Box<dyn FnMut(SwipeDetails)>;
type AnySwipeHandler = Box<dyn FnMut(SwipeDirection, SwipeDetails)>;
type PinchHandler = Box<dyn FnMut(f32)>;
type HapticHandler = Box<dyn FnMut(u64)>;

/// Registration surface for gesture notifications. Every slot is optional;
/// an unregistered slot simply drops the notification.
#[derive(Default)]
pub struct GestureCallbacks {
    on_tap: Option<PositionHandler>,
    on_double_tap: Option<PlainHandler>,
    on_long_press_start: Option<PlainHandler>,
    on_long_press: Option<LongPressHandler>,
    on_long_press_end: Option<PlainHandler>,
    on_long_press_cancel: Option<PlainHandler>,
    on_swipe_left: Option<SwipeHandler>,
    on_swipe_right: Option<SwipeHandler>,
    on_swipe_up: Option<SwipeHandler>,
    on_swipe_down: Option<SwipeHandler>,
    on_swipe: Option<AnySwipeHandler>,
    on_pinch_start: Option<PlainHandler>,
    on_pinch: Option<PinchHandler>,
    on_pinch_end: Option<PlainHandler>,
    on_haptic: Option<HapticHandler>,
}

impl GestureCallbacks {
    pub fn on_tap(&mut self, handler: impl FnMut(f32, f32) + 'static) -> &mut Self {
        self.on_tap = Some(Box::new(handler));
        self
    }

    pub fn on_double_tap(&mut self, handler: impl FnMut() + 'static) -> &mut Self {
        self.on_double_tap = Some(Box::new(handler));
        self
    }

    pub fn on_long_press_start(&mut self, handler: impl FnMut() + 'static) -> &mut Self {
        self.on_long_press_start = Some(Box::new(handler));
        self
    }

    pub fn on_long_press(
        &mut self,
        handler: impl FnMut(f32, f32, LongPressDetails) + 'static,
    ) -> &mut Self {
        self.on_long_press = Some(Box::new(handler));
        self
    }

    pub fn on_long_press_end(&mut self, handler: impl FnMut() + 'static) -> &mut Self {
        self.on_long_press_end = Some(Box::new(handler));
        self
    }

    pub fn on_long_press_cancel(&mut self, handler: impl FnMut() + 'static) -> &mut Self {
        self.on_long_press_cancel = Some(Box::new(handler));
        self
    }

    pub fn on_swipe_left(&mut self, handler: impl FnMut(SwipeDetails) + 'static) -> &mut Self {
        self.on_swipe_left = Some(Box::new(handler));
        self
    }

    pub fn on_swipe_right(&mut self, handler: impl FnMut(SwipeDetails) + 'static) -> &mut Self {
        self.on_swipe_right = Some(Box::new(handler));
        self
    }

    pub fn on_swipe_up(&mut self, handler: impl FnMut(SwipeDetails) + 'static) -> &mut Self {
        self.on_swipe_up = Some(Box::new(handler));
        self
    }

    pub fn on_swipe_down(&mut self, handler: impl FnMut(SwipeDetails) + 'static) -> &mut Self {
        self.on_swipe_down = Some(Box::new(handler));
        self
    }

    pub fn on_swipe(
        &mut self,
        handler: impl FnMut(SwipeDirection, SwipeDetails) + 'static,
    ) -> &mut Self {
        self.on_swipe = Some(Box::new(handler));
        self
    }

    pub fn on_pinch_start(&mut self, handler: impl FnMut() + 'static) -> &mut Self {
        self.on_pinch_start = Some(Box::new(handler));
        self
    }

    pub fn on_pinch(&mut self, handler: impl FnMut(f32) + 'static) -> &mut Self {
        self.on_pinch = Some(Box::new(handler));
        self
    }

    pub fn on_pinch_end(&mut self, handler: impl FnMut() + 'static) -> &mut Self {
        self.on_pinch_end = Some(Box::new(handler));
        self
    }

    /// Best-effort haptic hook, invoked with the requested pulse length when
    /// a long press or swipe is recognized.
    pub fn on_haptic(&mut self, handler: impl FnMut(u64) + 'static) -> &mut Self {
        self.on_haptic = Some(Box::new(handler));
        self
    }
}

/// Single-owner gesture engine. Feed it [`PointerEvent`]s via [`handle`],
/// give it the current time via [`poll`] when no events are flowing, and
/// register interest through [`callbacks`].
///
/// [`handle`]: GestureEngine::handle
/// [`poll`]: GestureEngine::poll
/// [`callbacks`]: GestureEngine::callbacks
pub struct GestureEngine {
    machine: statig::blocking::StateMachine<GestureHsm>,
    callbacks: GestureCallbacks,
    config: GestureConfig,
    disposed: bool,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    /// Style hint for hosts embedding the gesture surface: native scroll
    /// handling should be disabled while the engine is consuming events.
    /// Carries no logic.
    pub const TOUCH_ACTION_HINT: &'static str = "none";

    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            machine: GestureHsm::new(config).state_machine(),
            callbacks: GestureCallbacks::default(),
            config,
            disposed: false,
        }
    }

    pub fn callbacks(&mut self) -> &mut GestureCallbacks {
        &mut self.callbacks
    }

    /// Routes one contact event. A long-press deadline that elapsed before
    /// this event's timestamp is delivered first, so expiry is recognized
    /// ahead of the input that follows it.
    pub fn handle(&mut self, event: PointerEvent) {
        if self.disposed {
            return;
        }
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&EngineHsmEvent::TimerDue { now_ms: event.ms }, &mut context);
        self.machine
            .handle_with_context(&EngineHsmEvent::Pointer(event), &mut context);
        self.dispatch(context);
    }

    /// Advances the engine's clock without an input event, firing a due
    /// long press. Hosts with real timers call this from a wakeup scheduled
    /// at [`next_deadline`]; hosts without timers may skip it entirely and
    /// long-press detection degrades to firing on the next event.
    ///
    /// [`next_deadline`]: GestureEngine::next_deadline
    pub fn poll(&mut self, now_ms: u64) {
        if self.disposed {
            return;
        }
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&EngineHsmEvent::TimerDue { now_ms }, &mut context);
        self.dispatch(context);
    }

    /// The pending long-press deadline, if one is armed.
    pub fn next_deadline(&self) -> Option<u64> {
        if self.disposed {
            return None;
        }
        self.machine.inner().long_press_deadline()
    }

    /// Drops all contact state and the pending deadline. No callback fires
    /// after disposal; further events are ignored.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.machine = GestureHsm::new(self.config).state_machine();
    }

    fn dispatch(&mut self, context: DispatchContext) {
        for event in context.events {
            log::debug!("gesture: {event:?}");
            match event {
                GestureEvent::Tap { x, y } => {
                    if let Some(handler) = self.callbacks.on_tap.as_mut() {
                        handler(x, y);
                    }
                }
                GestureEvent::DoubleTap { .. } => {
                    if let Some(handler) = self.callbacks.on_double_tap.as_mut() {
                        handler();
                    }
                }
                GestureEvent::LongPress { x, y, details } => {
                    if let Some(handler) = self.callbacks.on_long_press_start.as_mut() {
                        handler();
                    }
                    if let Some(handler) = self.callbacks.on_long_press.as_mut() {
                        handler(x, y, details);
                    }
                    self.pulse_haptic();
                }
                GestureEvent::LongPressEnd => {
                    if let Some(handler) = self.callbacks.on_long_press_end.as_mut() {
                        handler();
                    }
                }
                GestureEvent::LongPressCancel => {
                    if let Some(handler) = self.callbacks.on_long_press_cancel.as_mut() {
                        handler();
                    }
                }
                GestureEvent::Swipe { direction, details } => {
                    let directional = match direction {
                        SwipeDirection::Left => self.callbacks.on_swipe_left.as_mut(),
                        SwipeDirection::Right => self.callbacks.on_swipe_right.as_mut(),
                        SwipeDirection::Up => self.callbacks.on_swipe_up.as_mut(),
                        SwipeDirection::Down => self.callbacks.on_swipe_down.as_mut(),
                    };
                    if let Some(handler) = directional {
                        handler(details);
                    }
                    if let Some(handler) = self.callbacks.on_swipe.as_mut() {
                        handler(direction, details);
                    }
                    self.pulse_haptic();
                }
                GestureEvent::PinchStart => {
                    if let Some(handler) = self.callbacks.on_pinch_start.as_mut() {
                        handler();
                    }
                }
                GestureEvent::Pinch { scale } => {
                    if let Some(handler) = self.callbacks.on_pinch.as_mut() {
                        handler(scale);
                    }
                }
                GestureEvent::PinchEnd => {
                    if let Some(handler) = self.callbacks.on_pinch_end.as_mut() {
                        handler();
                    }
                }
            }
        }
    }

    fn pulse_haptic(&mut self) {
        if let Some(handler) = self.callbacks.on_haptic.as_mut() {
            handler(self.config.haptic_pulse_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Seen {
        Tap(f32, f32),
        DoubleTap,
        LongPressStart,
        LongPress(f32, f32, u64),
        LongPressEnd,
        LongPressCancel,
        DirectionalSwipe(SwipeDirection),
        Swipe(SwipeDirection),
        PinchStart,
        Pinch(f32),
        PinchEnd,
        Haptic(u64),
    }

    fn recording_engine() -> (GestureEngine, Rc<RefCell<Vec<Seen>>>) {
        recording_engine_with(GestureConfig::default())
    }

    fn recording_engine_with(config: GestureConfig) -> (GestureEngine, Rc<RefCell<Vec<Seen>>>) {
        let mut engine = GestureEngine::with_config(config);
        let seen: Rc<RefCell<Vec<Seen>>> = Rc::new(RefCell::new(Vec::new()));

        let callbacks = engine.callbacks();
        let sink = seen.clone();
        callbacks.on_tap(move |x, y| sink.borrow_mut().push(Seen::Tap(x, y)));
        let sink = seen.clone();
        callbacks.on_double_tap(move || sink.borrow_mut().push(Seen::DoubleTap));
        let sink = seen.clone();
        callbacks.on_long_press_start(move || sink.borrow_mut().push(Seen::LongPressStart));
        let sink = seen.clone();
        callbacks.on_long_press(move |x, y, details| {
            sink.borrow_mut()
                .push(Seen::LongPress(x, y, details.duration_ms));
        });
        let sink = seen.clone();
        callbacks.on_long_press_end(move || sink.borrow_mut().push(Seen::LongPressEnd));
        let sink = seen.clone();
        callbacks.on_long_press_cancel(move || sink.borrow_mut().push(Seen::LongPressCancel));
        let sink = seen.clone();
        callbacks.on_swipe_left(move |_| {
            sink.borrow_mut()
                .push(Seen::DirectionalSwipe(SwipeDirection::Left));
        });
        let sink = seen.clone();
        callbacks.on_swipe_right(move |_| {
            sink.borrow_mut()
                .push(Seen::DirectionalSwipe(SwipeDirection::Right));
        });
        let sink = seen.clone();
        callbacks.on_swipe_up(move |_| {
            sink.borrow_mut()
                .push(Seen::DirectionalSwipe(SwipeDirection::Up));
        });
        let sink = seen.clone();
        callbacks.on_swipe_down(move |_| {
            sink.borrow_mut()
                .push(Seen::DirectionalSwipe(SwipeDirection::Down));
        });
        let sink = seen.clone();
        callbacks.on_swipe(move |direction, _| sink.borrow_mut().push(Seen::Swipe(direction)));
        let sink = seen.clone();
        callbacks.on_pinch_start(move || sink.borrow_mut().push(Seen::PinchStart));
        let sink = seen.clone();
        callbacks.on_pinch(move |scale| sink.borrow_mut().push(Seen::Pinch(scale)));
        let sink = seen.clone();
        callbacks.on_pinch_end(move || sink.borrow_mut().push(Seen::PinchEnd));
        let sink = seen.clone();
        callbacks.on_haptic(move |ms| sink.borrow_mut().push(Seen::Haptic(ms)));

        (engine, seen)
    }

    #[test]
    fn tap_reports_release_position() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.handle(PointerEvent::end(1, 100.0, 102.0, 150));

        assert_eq!(*seen.borrow(), vec![Seen::Tap(100.0, 102.0)]);
    }

    #[test]
    fn small_movement_keeps_the_tap() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.handle(PointerEvent::moved(1, 105.0, 100.0, 80));
        engine.handle(PointerEvent::end(1, 105.0, 100.0, 150));

        assert_eq!(*seen.borrow(), vec![Seen::Tap(105.0, 100.0)]);
    }

    #[test]
    fn second_tap_in_window_becomes_double_tap() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 50.0, 50.0, 0));
        engine.handle(PointerEvent::end(1, 50.0, 50.0, 100));
        engine.handle(PointerEvent::start(2, 51.0, 50.0, 150));
        engine.handle(PointerEvent::end(2, 51.0, 50.0, 180));
        // Pairing was consumed: a third rapid tap is single again.
        engine.handle(PointerEvent::start(3, 50.0, 50.0, 300));
        engine.handle(PointerEvent::end(3, 50.0, 50.0, 340));

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::Tap(50.0, 50.0),
                Seen::DoubleTap,
                Seen::Tap(50.0, 50.0),
            ]
        );
    }

    #[test]
    fn long_press_fires_on_poll_and_suppresses_tap() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        assert_eq!(engine.next_deadline(), Some(500));

        engine.poll(600);
        engine.handle(PointerEvent::end(1, 100.0, 100.0, 700));

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::LongPressStart,
                Seen::LongPress(100.0, 100.0, 600),
                Seen::Haptic(10),
                Seen::LongPressEnd,
            ]
        );
    }

    #[test]
    fn long_press_fires_from_a_late_event() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        // No poll: the first event past the deadline delivers the expiry
        // before its own movement is applied.
        engine.handle(PointerEvent::moved(1, 102.0, 100.0, 550));
        engine.handle(PointerEvent::end(1, 102.0, 100.0, 620));

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::LongPressStart,
                Seen::LongPress(100.0, 100.0, 550),
                Seen::Haptic(10),
                Seen::LongPressEnd,
            ]
        );
    }

    #[test]
    fn movement_past_tolerance_cancels_long_press() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.handle(PointerEvent::moved(1, 150.0, 100.0, 100));
        assert_eq!(engine.next_deadline(), None);

        // Time passing afterwards must not resurrect it.
        engine.poll(700);
        engine.handle(PointerEvent::end(1, 150.0, 100.0, 720));

        assert_eq!(*seen.borrow(), vec![Seen::LongPressCancel]);
    }

    #[test]
    fn swipe_right_after_cancelled_long_press() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.handle(PointerEvent::moved(1, 220.0, 100.0, 120));
        engine.handle(PointerEvent::end(1, 220.0, 100.0, 120));

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::LongPressCancel,
                Seen::DirectionalSwipe(SwipeDirection::Right),
                Seen::Swipe(SwipeDirection::Right),
                Seen::Haptic(10),
            ]
        );
    }

    #[test]
    fn fast_flick_swipes_by_velocity() {
        let (mut engine, seen) = recording_engine();

        // 30 px in 20 ms: below the distance threshold, above velocity.
        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.handle(PointerEvent::end(1, 100.0, 70.0, 20));

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::DirectionalSwipe(SwipeDirection::Up),
                Seen::Swipe(SwipeDirection::Up),
                Seen::Haptic(10),
            ]
        );
    }

    #[test]
    fn abandoned_drag_reports_nothing() {
        let (mut engine, seen) = recording_engine();

        // 30 px in 400 ms fails tap, distance, and velocity criteria.
        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.handle(PointerEvent::moved(1, 130.0, 100.0, 200));
        engine.handle(PointerEvent::end(1, 130.0, 100.0, 400));

        assert_eq!(*seen.borrow(), vec![Seen::LongPressCancel]);
    }

    #[test]
    fn pinch_scales_against_baseline() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 0.0, 0.0, 0));
        engine.handle(PointerEvent::start(2, 100.0, 0.0, 10));
        engine.handle(PointerEvent::moved(2, 150.0, 0.0, 30));
        // Same position again: no re-report.
        engine.handle(PointerEvent::moved(2, 150.0, 0.0, 40));
        engine.handle(PointerEvent::moved(2, 100.0, 0.0, 60));
        engine.handle(PointerEvent::end(2, 100.0, 0.0, 80));
        // The remaining contact is inert: no tap/swipe on its release.
        engine.handle(PointerEvent::end(1, 0.0, 0.0, 100));

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::PinchStart,
                Seen::Pinch(1.5),
                Seen::Pinch(1.0),
                Seen::PinchEnd,
            ]
        );
    }

    #[test]
    fn second_contact_discards_long_press_silently() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 0.0, 0.0, 0));
        engine.handle(PointerEvent::start(2, 100.0, 0.0, 100));
        assert_eq!(engine.next_deadline(), None);
        engine.poll(700);

        assert_eq!(*seen.borrow(), vec![Seen::PinchStart]);
    }

    #[test]
    fn third_contact_ends_the_pinch_session() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 0.0, 0.0, 0));
        engine.handle(PointerEvent::start(2, 100.0, 0.0, 10));
        engine.handle(PointerEvent::start(3, 50.0, 80.0, 20));
        engine.handle(PointerEvent::end(3, 50.0, 80.0, 40));
        engine.handle(PointerEvent::end(2, 100.0, 0.0, 60));
        engine.handle(PointerEvent::end(1, 0.0, 0.0, 80));

        assert_eq!(*seen.borrow(), vec![Seen::PinchStart, Seen::PinchEnd]);
    }

    #[test]
    fn interaction_after_pinch_classifies_normally() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 0.0, 0.0, 0));
        engine.handle(PointerEvent::start(2, 100.0, 0.0, 10));
        engine.handle(PointerEvent::end(2, 100.0, 0.0, 30));
        engine.handle(PointerEvent::end(1, 0.0, 0.0, 50));
        seen.borrow_mut().clear();

        engine.handle(PointerEvent::start(9, 10.0, 10.0, 1_000));
        engine.handle(PointerEvent::end(9, 10.0, 10.0, 1_100));

        assert_eq!(*seen.borrow(), vec![Seen::Tap(10.0, 10.0)]);
    }

    #[test]
    fn dispose_drops_pending_long_press() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.dispose();
        engine.poll(1_000);
        engine.handle(PointerEvent::end(1, 100.0, 100.0, 1_050));

        assert!(seen.borrow().is_empty());
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn stale_and_duplicate_events_are_ignored() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::moved(5, 10.0, 10.0, 0));
        engine.handle(PointerEvent::end(5, 10.0, 10.0, 5));

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 10));
        engine.handle(PointerEvent::end(1, 100.0, 100.0, 60));
        // Duplicate end for an already released id.
        engine.handle(PointerEvent::end(1, 100.0, 100.0, 70));

        assert_eq!(*seen.borrow(), vec![Seen::Tap(100.0, 100.0)]);
    }

    #[test]
    fn cancel_reports_no_gesture() {
        let (mut engine, seen) = recording_engine();

        engine.handle(PointerEvent::start(1, 100.0, 100.0, 0));
        engine.handle(PointerEvent::cancel(1, 100.0, 100.0, 50));
        engine.poll(700);

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn custom_config_thresholds_apply() {
        let config = GestureConfig {
            long_press_ms: 200,
            ..GestureConfig::default()
        };
        let (mut engine, seen) = recording_engine_with(config);

        engine.handle(PointerEvent::start(1, 10.0, 10.0, 0));
        engine.poll(250);

        assert_eq!(
            *seen.borrow(),
            vec![
                Seen::LongPressStart,
                Seen::LongPress(10.0, 10.0, 250),
                Seen::Haptic(10),
            ]
        );
    }
}
