use statig::prelude::*;

use super::{DispatchContext, EngineHsmEvent};
use crate::config::GestureConfig;
use crate::contact::{distance, Contact, ContactTracker};
use crate::events::{ContactId, GestureEvent, LongPressDetails, PointerEvent, PointerEventKind};
use crate::long_press::LongPressTimer;
use crate::pinch::PinchTracker;
use crate::swipe;
use crate::tap::{TapDecision, TapDisambiguator};

/// Per-engine state shared across all machine states. The machine enforces
/// mutual exclusion by construction: once an interaction enters a pinch or a
/// long press has fired, releases can no longer reach tap/swipe
/// classification.
pub(super) struct GestureHsm {
    config: GestureConfig,
    contacts: ContactTracker,
    pinch: PinchTracker,
    long_press: LongPressTimer,
    tap: TapDisambiguator,
    pressed_id: Option<ContactId>,
}

impl GestureHsm {
    pub(super) fn new(config: GestureConfig) -> Self {
        Self {
            config,
            contacts: ContactTracker::new(),
            pinch: PinchTracker::new(config.pinch_scale_sensitivity),
            long_press: LongPressTimer::new(),
            tap: TapDisambiguator::new(),
            pressed_id: None,
        }
    }

    pub(super) fn long_press_deadline(&self) -> Option<u64> {
        self.long_press.deadline()
    }

    fn pair_distance(&self) -> Option<f32> {
        self.contacts
            .pair()
            .map(|(a, b)| distance(a.last_x, a.last_y, b.last_x, b.last_y))
    }

    /// Per-interaction cleanup on the transition back to idle. Double-tap
    /// memory survives: it spans interactions by definition.
    fn reset_interaction(&mut self) {
        self.long_press.cancel();
        self.pinch.end();
        self.pressed_id = None;
    }

    /// Applies the final coordinates carried by an end/cancel event and
    /// removes the contact. `None` for stale or duplicate releases.
    fn take_released(&mut self, pointer: &PointerEvent) -> Option<Contact> {
        self.contacts.moved(pointer.id, pointer.x, pointer.y);
        self.contacts.remove(pointer.id)
    }

    /// Terminal classification for a released single contact: tap,
    /// double-tap, swipe, or nothing.
    fn classify_release(
        &mut self,
        context: &mut DispatchContext,
        contact: &Contact,
        now_ms: u64,
    ) {
        let decision = self.tap.on_release(
            contact.distance_from_start(),
            contact.duration_since_start(now_ms),
            now_ms,
            &self.config,
        );
        match decision {
            TapDecision::Tap => context.emit(GestureEvent::Tap {
                x: contact.last_x,
                y: contact.last_y,
            }),
            TapDecision::DoubleTap => context.emit(GestureEvent::DoubleTap {
                x: contact.last_x,
                y: contact.last_y,
            }),
            TapDecision::NotATap => {
                if let Some((direction, details)) =
                    swipe::classify(contact, now_ms, &self.config)
                {
                    context.emit(GestureEvent::Swipe { direction, details });
                }
            }
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    /// No contacts. The only way out is a contact start.
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &EngineHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            EngineHsmEvent::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Start => {
                    if !self.contacts.start(pointer.id, pointer.x, pointer.y, pointer.ms) {
                        return Handled;
                    }
                    self.long_press.arm(pointer.ms, self.config.long_press_ms);
                    Transition(State::single_active())
                }
                _ => {
                    // Stale moves or duplicate end/cancel pairs show up in
                    // real input streams; they carry no information here.
                    log::trace!("idle: ignoring {:?} for contact {}", pointer.kind, pointer.id);
                    Handled
                }
            },
            EngineHsmEvent::TimerDue { .. } => Handled,
        }
    }

    /// Exactly one contact, long press armed until movement or release.
    #[state]
    fn single_active(
        &mut self,
        context: &mut DispatchContext,
        event: &EngineHsmEvent,
    ) -> Outcome<State> {
        match event {
            EngineHsmEvent::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Start => {
                    if !self.contacts.start(pointer.id, pointer.x, pointer.y, pointer.ms) {
                        return Handled;
                    }
                    // Second contact: the interaction is a pinch from here
                    // on. The pending long press is discarded silently.
                    self.long_press.cancel();
                    match self.pair_distance() {
                        Some(baseline) => {
                            self.pinch.begin(baseline);
                            context.emit(GestureEvent::PinchStart);
                            Transition(State::pinch_active())
                        }
                        None => Transition(State::suppressed()),
                    }
                }
                PointerEventKind::Move => {
                    if !self.contacts.moved(pointer.id, pointer.x, pointer.y) {
                        return Handled;
                    }
                    let past_tolerance = self
                        .contacts
                        .get(pointer.id)
                        .is_some_and(|contact| {
                            contact.distance_from_start() > self.config.movement_tolerance_px
                        });
                    if self.long_press.is_armed() && past_tolerance {
                        self.long_press.cancel();
                        context.emit(GestureEvent::LongPressCancel);
                    }
                    Handled
                }
                PointerEventKind::End => {
                    let Some(contact) = self.take_released(pointer) else {
                        return Handled;
                    };
                    self.long_press.cancel();
                    self.classify_release(context, &contact, pointer.ms);
                    self.reset_interaction();
                    Transition(State::idle())
                }
                PointerEventKind::Cancel => {
                    if self.take_released(pointer).is_none() {
                        return Handled;
                    }
                    self.reset_interaction();
                    Transition(State::idle())
                }
            },
            EngineHsmEvent::TimerDue { now_ms } => {
                if !self.long_press.fire_if_due(*now_ms) {
                    return Handled;
                }
                // Movement cancels the deadline as it happens, so the
                // contact is still within tolerance here.
                let Some(contact) = self.contacts.first() else {
                    return Handled;
                };
                self.pressed_id = Some(contact.id);
                context.emit(GestureEvent::LongPress {
                    x: contact.last_x,
                    y: contact.last_y,
                    details: LongPressDetails {
                        duration_ms: contact.duration_since_start(*now_ms),
                    },
                });
                Transition(State::long_pressed())
            }
        }
    }

    /// A long press has fired; the interaction is terminal. The pressed
    /// contact's release reports the end of the press, never a tap or
    /// swipe.
    #[state]
    fn long_pressed(
        &mut self,
        context: &mut DispatchContext,
        event: &EngineHsmEvent,
    ) -> Outcome<State> {
        match event {
            EngineHsmEvent::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Start => {
                    // Late extra contacts are tracked but inert.
                    self.contacts.start(pointer.id, pointer.x, pointer.y, pointer.ms);
                    Handled
                }
                PointerEventKind::Move => {
                    self.contacts.moved(pointer.id, pointer.x, pointer.y);
                    Handled
                }
                PointerEventKind::End | PointerEventKind::Cancel => {
                    let Some(contact) = self.take_released(pointer) else {
                        return Handled;
                    };
                    if self.pressed_id == Some(contact.id) {
                        self.pressed_id = None;
                        context.emit(GestureEvent::LongPressEnd);
                    }
                    if self.contacts.is_empty() {
                        self.reset_interaction();
                        Transition(State::idle())
                    } else if self.pressed_id.is_none() {
                        Transition(State::suppressed())
                    } else {
                        Handled
                    }
                }
            },
            EngineHsmEvent::TimerDue { .. } => Handled,
        }
    }

    /// Exactly two contacts; scale updates flow until either lifts or a
    /// third lands.
    #[state]
    fn pinch_active(
        &mut self,
        context: &mut DispatchContext,
        event: &EngineHsmEvent,
    ) -> Outcome<State> {
        match event {
            EngineHsmEvent::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Start => {
                    if !self.contacts.start(pointer.id, pointer.x, pointer.y, pointer.ms) {
                        return Handled;
                    }
                    // A third contact ends the pinch session; the rest of
                    // the interaction is inert.
                    self.pinch.end();
                    context.emit(GestureEvent::PinchEnd);
                    Transition(State::suppressed())
                }
                PointerEventKind::Move => {
                    if !self.contacts.moved(pointer.id, pointer.x, pointer.y) {
                        return Handled;
                    }
                    if let Some(current) = self.pair_distance() {
                        match self.pinch.update(current) {
                            Some(scale) => context.emit(GestureEvent::Pinch { scale }),
                            None => log::trace!("pinch: delta below sensitivity"),
                        }
                    }
                    Handled
                }
                PointerEventKind::End | PointerEventKind::Cancel => {
                    if self.take_released(pointer).is_none() {
                        return Handled;
                    }
                    self.pinch.end();
                    context.emit(GestureEvent::PinchEnd);
                    if self.contacts.is_empty() {
                        self.reset_interaction();
                        Transition(State::idle())
                    } else {
                        Transition(State::suppressed())
                    }
                }
            },
            EngineHsmEvent::TimerDue { .. } => Handled,
        }
    }

    /// A higher-priority gesture already claimed this interaction (a pinch
    /// session ended, or the pressed contact lifted while others remain).
    /// Remaining contacts are bookkept but classify as nothing until all
    /// lift.
    #[state]
    fn suppressed(
        &mut self,
        context: &mut DispatchContext,
        event: &EngineHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            EngineHsmEvent::Pointer(pointer) => match pointer.kind {
                PointerEventKind::Start => {
                    self.contacts.start(pointer.id, pointer.x, pointer.y, pointer.ms);
                    Handled
                }
                PointerEventKind::Move => {
                    self.contacts.moved(pointer.id, pointer.x, pointer.y);
                    Handled
                }
                PointerEventKind::End | PointerEventKind::Cancel => {
                    if self.take_released(pointer).is_none() {
                        return Handled;
                    }
                    if self.contacts.is_empty() {
                        self.reset_interaction();
                        Transition(State::idle())
                    } else {
                        Handled
                    }
                }
            },
            EngineHsmEvent::TimerDue { .. } => Handled,
        }
    }
}
