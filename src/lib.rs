//! Real-time gesture classification for a single pointer stream.
//!
//! Feed normalized contact events (start/move/end/cancel, with stable
//! contact ids) into a [`GestureEngine`] and register callbacks for the
//! gestures it disambiguates: tap, double-tap, long-press, four-directional
//! swipe, and two-finger pinch-zoom. The engine owns all interaction state,
//! fires exactly one gesture family per interaction, and never fires after
//! [`GestureEngine::dispose`].
//!
//! The engine is single-threaded and cooperatively driven: time advances
//! through event timestamps and explicit [`GestureEngine::poll`] calls, so
//! there are no internal threads or timers.

pub mod config;
pub mod contact;
pub mod engine;
pub mod events;
pub mod long_press;
pub mod pinch;
mod swipe;
pub mod tap;

pub use config::GestureConfig;
pub use engine::{GestureCallbacks, GestureEngine};
pub use events::{
    ContactId, GestureEvent, LongPressDetails, PointerEvent, PointerEventKind, SwipeDetails,
    SwipeDirection,
};
