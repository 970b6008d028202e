//! Core engine module - orchestrates the monitoring pipeline

mod engine;
mod event_bus;
pub mod scheduler;

pub use engine::{MonitorEngine, SourceFactory};
pub use event_bus::{EventBus, Notice, NoticeKind, NoticePayload};
pub use scheduler::TimerHandle;

use serde::Serialize;

use crate::events::Event;
use crate::monitor::SystemStatus;
use crate::telemetry::{AudioFrame, HardwareStatus, SystemHealth};

/// Read-only view of the whole console, taken on the render cadence.
///
/// Everything downstream (panels, charts, the map) consumes this as plain
/// data; nothing in it can mutate the reconciliation state.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub status: SystemStatus,
    pub current_event: Option<Event>,
    /// Most-recent-first, bounded
    pub history: Vec<Event>,
    /// True while the latest emergency has not been viewed
    pub unacknowledged: bool,
    pub hardware: HardwareStatus,
    pub audio: AudioFrame,
    pub health: SystemHealth,
}
