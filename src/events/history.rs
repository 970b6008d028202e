// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Bounded, insertion-ordered event history

use std::collections::VecDeque;

use super::{Event, EventId};

/// Most-recent-first log of classified events.
///
/// Length never exceeds the capacity; appending at capacity evicts the
/// oldest entry. No deduplication: repeated classes are all retained.
#[derive(Debug, Clone)]
pub struct EventHistory {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl EventHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend an event, evicting the oldest entry when full.
    pub fn append(&mut self, event: Event) {
        self.entries.push_front(event);
        self.entries.truncate(self.capacity);
    }

    /// Replace the whole buffer with a backend-authoritative snapshot,
    /// most-recent-first. Still bounded by the capacity.
    pub fn replace(&mut self, events: Vec<Event>) {
        self.entries = events.into_iter().take(self.capacity).collect();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate most-recent-first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Event> {
        self.entries.front()
    }

    /// The most recent emergency-class event, if any.
    pub fn latest_emergency(&self) -> Option<&Event> {
        self.entries.iter().find(|e| e.is_emergency())
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn to_vec(&self) -> Vec<Event> {
        self.entries.iter().cloned().collect()
    }
}
