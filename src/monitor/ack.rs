// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Emergency acknowledgment tracking

use crate::events::{EventHistory, EventId};

/// Remembers the last emergency event the operator has opened.
///
/// The alarm-driving flag is derived, not stored: it compares the most
/// recent emergency in history against the last viewed id on every read,
/// so any history change re-evaluates the condition.
#[derive(Debug, Clone, Default)]
pub struct AckTracker {
    last_viewed: Option<EventId>,
}

impl AckTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the operator viewed this event. Idempotent per id.
    pub fn acknowledge(&mut self, id: EventId) {
        self.last_viewed = Some(id);
    }

    pub fn last_viewed(&self) -> Option<EventId> {
        self.last_viewed
    }

    /// True while the most recent emergency in `history` has not been
    /// viewed. False when history holds no emergency at all.
    pub fn is_unacknowledged(&self, history: &EventHistory) -> bool {
        match history.latest_emergency() {
            Some(event) => self.last_viewed != Some(event.id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventClass};

    fn event(id: u64, class: EventClass) -> Event {
        Event {
            id: EventId(id),
            class,
            confidence: 92.0,
            timestamp: "2026-08-08 12:00:00".to_string(),
            location: None,
            video_url: None,
            map_link: None,
        }
    }

    #[test]
    fn test_acknowledge_silences_matching_emergency() {
        let mut history = EventHistory::new(10);
        let mut ack = AckTracker::new();

        history.append(event(1, EventClass::Scream));
        assert!(ack.is_unacknowledged(&history));

        ack.acknowledge(EventId(1));
        assert!(!ack.is_unacknowledged(&history));
    }

    #[test]
    fn test_normal_arrival_does_not_rearm() {
        let mut history = EventHistory::new(10);
        let mut ack = AckTracker::new();

        history.append(event(1, EventClass::Crash));
        ack.acknowledge(EventId(1));
        history.append(event(2, EventClass::Normal));

        assert!(!ack.is_unacknowledged(&history));
    }

    #[test]
    fn test_new_emergency_rearms() {
        let mut history = EventHistory::new(10);
        let mut ack = AckTracker::new();

        history.append(event(1, EventClass::Crash));
        ack.acknowledge(EventId(1));
        history.append(event(2, EventClass::Gun));

        assert!(ack.is_unacknowledged(&history));
    }

    #[test]
    fn test_acknowledge_is_idempotent() {
        let mut history = EventHistory::new(10);
        let mut ack = AckTracker::new();

        history.append(event(1, EventClass::Explosion));
        ack.acknowledge(EventId(1));
        ack.acknowledge(EventId(1));

        assert_eq!(ack.last_viewed(), Some(EventId(1)));
        assert!(!ack.is_unacknowledged(&history));
    }

    #[test]
    fn test_empty_history_never_alarms() {
        let history = EventHistory::new(10);
        let ack = AckTracker::new();
        assert!(!ack.is_unacknowledged(&history));
    }
}
