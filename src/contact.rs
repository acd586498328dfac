//! Per-contact tracking: the source of truth for contact geometry.

use heapless::Vec;

use crate::events::ContactId;

/// Upper bound on simultaneously tracked contacts. Real input sources stay
/// far below this; starts beyond the bound are dropped silently.
pub(crate) const MAX_CONTACTS: usize = 8;

/// One active point of input contact, from start until end/cancel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub start_x: f32,
    pub start_y: f32,
    pub start_ms: u64,
    pub last_x: f32,
    pub last_y: f32,
}

impl Contact {
    pub fn distance_from_start(&self) -> f32 {
        distance(self.start_x, self.start_y, self.last_x, self.last_y)
    }

    pub fn duration_since_start(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    /// Straight-line speed since contact start, in pixels per millisecond.
    /// Zero duration yields zero rather than dividing.
    pub fn velocity(&self, now_ms: u64) -> f32 {
        let duration_ms = self.duration_since_start(now_ms);
        if duration_ms == 0 {
            return 0.0;
        }
        self.distance_from_start() / duration_ms as f32
    }

    pub fn delta(&self) -> (f32, f32) {
        (self.last_x - self.start_x, self.last_y - self.start_y)
    }
}

/// Bounded id-to-contact mapping owned by the engine. All mutations ignore
/// ids that violate start-before-move-before-end ordering.
#[derive(Debug, Default)]
pub struct ContactTracker {
    contacts: Vec<Contact, MAX_CONTACTS>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == id)
    }

    pub fn first(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    /// The two oldest contacts, in start order. `None` unless at least two
    /// are active.
    pub fn pair(&self) -> Option<(&Contact, &Contact)> {
        match (self.contacts.first(), self.contacts.get(1)) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Registers a new contact. Duplicate starts for an active id and starts
    /// beyond capacity are ignored.
    pub fn start(&mut self, id: ContactId, x: f32, y: f32, ms: u64) -> bool {
        if self.get(id).is_some() {
            log::trace!("duplicate start for active contact {id}");
            return false;
        }
        self.contacts
            .push(Contact {
                id,
                start_x: x,
                start_y: y,
                start_ms: ms,
                last_x: x,
                last_y: y,
            })
            .is_ok()
    }

    /// Updates the current position of an active contact. Unknown ids are
    /// ignored.
    pub fn moved(&mut self, id: ContactId, x: f32, y: f32) -> bool {
        match self.contacts.iter_mut().find(|contact| contact.id == id) {
            Some(contact) => {
                contact.last_x = x;
                contact.last_y = y;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ContactId) -> Option<Contact> {
        let index = self.contacts.iter().position(|contact| contact.id == id)?;
        Some(self.contacts.remove(index))
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}

pub(crate) fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_move_remove_lifecycle() {
        let mut tracker = ContactTracker::new();
        assert!(tracker.start(1, 100.0, 100.0, 0));
        assert_eq!(tracker.len(), 1);

        assert!(tracker.moved(1, 103.0, 104.0));
        let contact = tracker.get(1).unwrap();
        assert_eq!(contact.start_x, 100.0);
        assert_eq!(contact.last_x, 103.0);
        assert_eq!(contact.last_y, 104.0);
        assert_eq!(contact.distance_from_start(), 5.0);

        assert!(tracker.remove(1).is_some());
        assert!(tracker.is_empty());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut tracker = ContactTracker::new();
        assert!(!tracker.moved(7, 10.0, 10.0));
        assert!(tracker.remove(7).is_none());

        assert!(tracker.start(7, 0.0, 0.0, 0));
        assert!(!tracker.start(7, 50.0, 50.0, 10));
        // The duplicate start must not reset the original record.
        assert_eq!(tracker.get(7).unwrap().start_ms, 0);
    }

    #[test]
    fn duration_and_velocity() {
        let mut tracker = ContactTracker::new();
        tracker.start(1, 0.0, 0.0, 100);
        tracker.moved(1, 120.0, 0.0);

        let contact = tracker.get(1).unwrap();
        assert_eq!(contact.duration_since_start(220), 120);
        assert_eq!(contact.velocity(220), 1.0);
        // Zero duration must not divide.
        assert_eq!(contact.velocity(100), 0.0);
        // A now before start saturates to zero duration.
        assert_eq!(contact.duration_since_start(50), 0);
    }

    #[test]
    fn pair_follows_start_order() {
        let mut tracker = ContactTracker::new();
        assert!(tracker.pair().is_none());

        tracker.start(4, 0.0, 0.0, 0);
        tracker.start(9, 100.0, 0.0, 5);
        let (a, b) = tracker.pair().unwrap();
        assert_eq!(a.id, 4);
        assert_eq!(b.id, 9);

        tracker.remove(4);
        assert!(tracker.pair().is_none());
        assert_eq!(tracker.first().unwrap().id, 9);
    }
}
