//! Release-time swipe classification.

use crate::config::GestureConfig;
use crate::contact::Contact;
use crate::events::{SwipeDetails, SwipeDirection};

/// Classifies a released contact as a cardinal swipe, or `None` for a plain
/// drag or abandoned touch.
///
/// Distance and velocity are alternatives, not a conjunction: a slow but
/// long drag and a fast but short flick both qualify, as long as the whole
/// interaction fits inside the swipe duration window.
pub(crate) fn classify(
    contact: &Contact,
    now_ms: u64,
    config: &GestureConfig,
) -> Option<(SwipeDirection, SwipeDetails)> {
    let duration_ms = contact.duration_since_start(now_ms);
    if duration_ms > config.swipe_max_duration_ms {
        return None;
    }

    let distance = contact.distance_from_start();
    let velocity = contact.velocity(now_ms);
    if distance < config.swipe_min_distance_px && velocity < config.swipe_min_velocity_px_ms {
        return None;
    }

    let (dx, dy) = contact.delta();
    let direction = if dx.abs() > dy.abs() {
        if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    } else if dy > 0.0 {
        SwipeDirection::Down
    } else {
        SwipeDirection::Up
    };

    Some((
        direction,
        SwipeDetails {
            distance,
            velocity,
            duration_ms,
            start_x: contact.start_x,
            start_y: contact.start_y,
            end_x: contact.last_x,
            end_y: contact.last_y,
            dx,
            dy,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(start: (f32, f32), end: (f32, f32)) -> Contact {
        Contact {
            id: 1,
            start_x: start.0,
            start_y: start.1,
            start_ms: 0,
            last_x: end.0,
            last_y: end.1,
        }
    }

    fn config() -> GestureConfig {
        GestureConfig::default()
    }

    #[test]
    fn long_drag_qualifies_by_distance() {
        let contact = contact((100.0, 100.0), (220.0, 100.0));
        let (direction, details) = classify(&contact, 120, &config()).unwrap();
        assert_eq!(direction, SwipeDirection::Right);
        assert_eq!(details.distance, 120.0);
        assert_eq!(details.duration_ms, 120);
        assert_eq!(details.velocity, 1.0);
        assert_eq!((details.dx, details.dy), (120.0, 0.0));
    }

    #[test]
    fn short_flick_qualifies_by_velocity() {
        // 30 px in 20 ms: under the distance threshold, over the velocity one.
        let contact = contact((0.0, 0.0), (0.0, -30.0));
        let (direction, details) = classify(&contact, 20, &config()).unwrap();
        assert_eq!(direction, SwipeDirection::Up);
        assert_eq!(details.velocity, 1.5);
    }

    #[test]
    fn slow_short_movement_is_no_gesture() {
        // 30 px in 200 ms fails both thresholds.
        let contact = contact((0.0, 0.0), (30.0, 0.0));
        assert!(classify(&contact, 200, &config()).is_none());
    }

    #[test]
    fn overlong_interaction_is_no_gesture() {
        let contact = contact((0.0, 0.0), (300.0, 0.0));
        assert!(classify(&contact, 900, &config()).is_none());
    }

    #[test]
    fn direction_follows_dominant_axis() {
        let cases = [
            ((200.0f32, 10.0f32), SwipeDirection::Right),
            ((-200.0, 10.0), SwipeDirection::Left),
            ((10.0, 200.0), SwipeDirection::Down),
            ((10.0, -200.0), SwipeDirection::Up),
        ];
        for ((dx, dy), expected) in cases {
            let contact = contact((0.0, 0.0), (dx, dy));
            let (direction, _) = classify(&contact, 100, &config()).unwrap();
            assert_eq!(direction, expected, "delta ({dx}, {dy})");
        }
    }

    #[test]
    fn equal_axes_break_vertical() {
        let contact = contact((0.0, 0.0), (100.0, 100.0));
        let (direction, _) = classify(&contact, 100, &config()).unwrap();
        assert_eq!(direction, SwipeDirection::Down);
    }
}
