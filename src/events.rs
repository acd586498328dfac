//! Input and output event types for the gesture engine.

/// Stable identifier for one continuous contact, unique among simultaneously
/// active contacts. Input sources may recycle an id after the contact ends.
pub type ContactId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Start,
    Move,
    End,
    Cancel,
}

/// One normalized contact event as delivered by the host input layer.
///
/// For a given id the host delivers `Start` before `Move` before
/// `End`/`Cancel`, and never reuses the id without a new `Start`. Events
/// violating that ordering are ignored by the engine rather than rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub id: ContactId,
    pub kind: PointerEventKind,
    pub x: f32,
    pub y: f32,
    pub ms: u64,
}

impl PointerEvent {
    pub fn start(id: ContactId, x: f32, y: f32, ms: u64) -> Self {
        Self::new(id, PointerEventKind::Start, x, y, ms)
    }

    pub fn moved(id: ContactId, x: f32, y: f32, ms: u64) -> Self {
        Self::new(id, PointerEventKind::Move, x, y, ms)
    }

    pub fn end(id: ContactId, x: f32, y: f32, ms: u64) -> Self {
        Self::new(id, PointerEventKind::End, x, y, ms)
    }

    pub fn cancel(id: ContactId, x: f32, y: f32, ms: u64) -> Self {
        Self::new(id, PointerEventKind::Cancel, x, y, ms)
    }

    fn new(id: ContactId, kind: PointerEventKind, x: f32, y: f32, ms: u64) -> Self {
        Self { id, kind, x, y, ms }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Geometry of a recognized swipe, measured from contact start to release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeDetails {
    pub distance: f32,
    /// Pixels per millisecond; 0 when the swipe had zero duration.
    pub velocity: f32,
    pub duration_ms: u64,
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LongPressDetails {
    pub duration_ms: u64,
}

/// A recognized gesture. The engine emits at most a handful of these per
/// input event and dispatches each to the matching callback slots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Tap { x: f32, y: f32 },
    DoubleTap { x: f32, y: f32 },
    LongPress { x: f32, y: f32, details: LongPressDetails },
    LongPressEnd,
    LongPressCancel,
    Swipe { direction: SwipeDirection, details: SwipeDetails },
    PinchStart,
    Pinch { scale: f32 },
    PinchEnd,
}
