// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! System alert status state machine

use serde::{Deserialize, Serialize};

use crate::events::EventClass;

/// Operational status of the console.
///
/// `Alert` is a transient super-state of `Listening`: it reverts on its own
/// after the dwell window unless re-triggered. `Offline` is only reachable
/// through an explicit stop, and never escalates directly to `Alert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemStatus {
    Offline,
    Listening,
    Alert,
}

/// Token tying a dwell timer to the escalation that armed it.
pub type DwellGeneration = u64;

/// Derives system status from arriving event classes and dwell timers.
#[derive(Debug, Clone)]
pub struct AlertMachine {
    status: SystemStatus,
    generation: DwellGeneration,
}

impl AlertMachine {
    pub fn new() -> Self {
        Self {
            status: SystemStatus::Offline,
            generation: 0,
        }
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    /// Explicit start command. Only `Offline -> Listening`.
    pub fn start(&mut self) -> bool {
        if self.status == SystemStatus::Offline {
            self.status = SystemStatus::Listening;
            true
        } else {
            false
        }
    }

    /// Explicit stop command. Invalidates any pending dwell timer.
    pub fn stop(&mut self) {
        self.status = SystemStatus::Offline;
        self.generation += 1;
    }

    /// Feed an arriving event's class through the machine. Severe classes
    /// escalate to `Alert` and return a fresh dwell generation to arm; each
    /// new trigger restarts the dwell independently.
    pub fn observe(&mut self, class: EventClass) -> Option<DwellGeneration> {
        if self.status == SystemStatus::Offline || !class.is_severe() {
            return None;
        }
        self.status = SystemStatus::Alert;
        self.generation += 1;
        Some(self.generation)
    }

    /// Dwell timer callback. Downgrades to `Listening` only when
    /// `generation` matches the latest escalation, so an overlapping timer
    /// from a superseded trigger cannot cut a newer alert short.
    pub fn dwell_expired(&mut self, generation: DwellGeneration) -> bool {
        if self.status == SystemStatus::Alert && self.generation == generation {
            self.status = SystemStatus::Listening;
            true
        } else {
            false
        }
    }
}

impl Default for AlertMachine {
    fn default() -> Self {
        Self::new()
    }
}
