//! Alert-state reconciliation core.
//!
//! All of status, current event, history, and acknowledgment live in one
//! [`MonitorState`] container with pure transition functions. Transitions
//! return [`TimerRequest`]s instead of arming timers themselves; the engine
//! interprets those against its scheduler. This keeps the state machine
//! fully unit-testable without a runtime.

mod ack;
mod alert;
mod resolver;

pub use ack::AckTracker;
pub use alert::{AlertMachine, DwellGeneration, SystemStatus};
pub use resolver::{CurrentEventResolver, HoldGeneration, Placement};

use crate::events::{Event, EventHistory, EventId};

/// Timer work requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    /// (Re)arm the current-event hold timer. Supersedes any pending hold:
    /// the engine must cancel the previous handle before arming this one.
    Hold(HoldGeneration),
    /// Arm an alert dwell timer for this escalation.
    Dwell(DwellGeneration),
}

/// The whole reconciliation state, one atomic logical step per event.
#[derive(Debug, Clone)]
pub struct MonitorState {
    alert: AlertMachine,
    resolver: CurrentEventResolver,
    history: EventHistory,
    ack: AckTracker,
    /// Highest event id ingested so far; decides freshness during a
    /// backend history sync.
    seen_head: Option<EventId>,
}

impl MonitorState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            alert: AlertMachine::new(),
            resolver: CurrentEventResolver::new(),
            history: EventHistory::new(history_capacity),
            ack: AckTracker::new(),
            seen_head: None,
        }
    }

    pub fn status(&self) -> SystemStatus {
        self.alert.status()
    }

    pub fn current_event(&self) -> Option<&Event> {
        self.resolver.current()
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    pub fn is_unacknowledged(&self) -> bool {
        self.ack.is_unacknowledged(&self.history)
    }

    /// Process one arriving event: append to history, resolve the display
    /// slot, and escalate status. Events cannot arrive while `Offline`; a
    /// straggler from a cancelled source is dropped.
    pub fn ingest(&mut self, event: Event) -> Vec<TimerRequest> {
        if self.alert.status() == SystemStatus::Offline {
            return Vec::new();
        }

        self.note_seen(event.id);
        self.history.append(event.clone());

        let mut timers = Vec::new();
        if let Placement::Held(generation) = self.resolver.offer(event.clone()) {
            timers.push(TimerRequest::Hold(generation));
        }
        if let Some(generation) = self.alert.observe(event.class) {
            timers.push(TimerRequest::Dwell(generation));
        }
        timers
    }

    /// Replace history with a backend-authoritative snapshot
    /// (most-recent-first) and run events newer than the watermark through
    /// the resolver and alert machine, oldest first.
    ///
    /// History is replaced even while `Offline` — the backend owns it and
    /// the console shows it with the mic off — but no escalation or display
    /// resolution happens then, keeping `Offline -> Alert` impossible.
    pub fn sync_history(&mut self, events: Vec<Event>) -> Vec<TimerRequest> {
        let fresh: Vec<Event> = events
            .iter()
            .filter(|e| self.seen_head.map_or(true, |head| e.id > head))
            .cloned()
            .collect();

        self.history.replace(events);

        let mut timers = Vec::new();
        for event in fresh.into_iter().rev() {
            self.note_seen(event.id);
            if self.alert.status() == SystemStatus::Offline {
                continue;
            }
            if let Placement::Held(generation) = self.resolver.offer(event.clone()) {
                timers.push(TimerRequest::Hold(generation));
            }
            if let Some(generation) = self.alert.observe(event.class) {
                timers.push(TimerRequest::Dwell(generation));
            }
        }
        timers
    }

    /// Hold timer callback; stale generations no-op.
    pub fn hold_expired(&mut self, generation: HoldGeneration) -> bool {
        self.resolver.hold_expired(generation)
    }

    /// Dwell timer callback; stale generations no-op.
    pub fn dwell_expired(&mut self, generation: DwellGeneration) -> bool {
        self.alert.dwell_expired(generation)
    }

    /// Start command. Only effective while `Offline`.
    pub fn start(&mut self) -> bool {
        self.alert.start()
    }

    /// Stop command: clears the current event and invalidates pending
    /// timers, but keeps history and acknowledgment state.
    pub fn stop(&mut self) {
        self.alert.stop();
        self.resolver.clear();
    }

    /// Operator viewed an event's evidence.
    pub fn acknowledge(&mut self, id: EventId) {
        self.ack.acknowledge(id);
    }

    fn note_seen(&mut self, id: EventId) {
        if self.seen_head.map_or(true, |head| id > head) {
            self.seen_head = Some(id);
        }
    }
}
