// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Current-event resolution with emergency hold windows

use crate::events::Event;

/// Token tying a hold timer to the arming that created it. Bumped on every
/// preemption, so a stale timer can never clear a newer event.
pub type HoldGeneration = u64;

/// Outcome of offering an event to the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Emergency took the slot; arm a hold timer tagged with this generation
    Held(HoldGeneration),
    /// Normal event took the unheld slot, no timer
    Shown,
    /// Normal event suppressed by an active hold (still goes to history)
    Suppressed,
}

/// Decides which single event the console displays prominently.
///
/// Emergency events always preempt, including a still-held emergency, and
/// occupy the slot for a fixed hold window. Normal events only land while
/// no hold is active and may be overwritten immediately.
#[derive(Debug, Clone, Default)]
pub struct CurrentEventResolver {
    current: Option<Event>,
    holding: bool,
    generation: HoldGeneration,
}

impl CurrentEventResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Event> {
        self.current.as_ref()
    }

    /// Whether an emergency event is inside its hold window.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Offer an arriving event for display.
    pub fn offer(&mut self, event: Event) -> Placement {
        if event.is_emergency() {
            self.generation += 1;
            self.current = Some(event);
            self.holding = true;
            Placement::Held(self.generation)
        } else if self.holding {
            Placement::Suppressed
        } else {
            self.current = Some(event);
            Placement::Shown
        }
    }

    /// Hold timer callback. Clears the slot only if `generation` still
    /// matches the arming that scheduled it; a stale fire is a no-op.
    pub fn hold_expired(&mut self, generation: HoldGeneration) -> bool {
        if self.holding && self.generation == generation {
            self.current = None;
            self.holding = false;
            true
        } else {
            false
        }
    }

    /// Drop the slot outright (system stop). Invalidates pending holds.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
        self.holding = false;
    }
}
