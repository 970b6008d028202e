// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! CityHear - Audio Emergency Event Monitoring Console
//!
//! The reconciliation core of a real-time street-audio emergency console:
//! - Classified event intake (crash / explosion / scream / gunshot)
//! - Current-event resolution with emergency hold windows
//! - Offline / Listening / Alert status machine with auto-reverting dwell
//! - Bounded event history and operator acknowledgment tracking
//! - Live waveform, decibel, and host-health telemetry
//! - Simulated source for demos, HTTP poller for real deployments
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Monitor Engine                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌─────────┐  │
//! │  │ Simulator│ → │ Resolver/ │ → │  History │ → │  Alarm  │  │
//! │  │ / Poller │   │ AlertSM   │   │  Buffer  │   │  Gate   │  │
//! │  └──────────┘   └───────────┘   └──────────┘   └─────────┘  │
//! │       ↓              ↓               ↓              ↓       │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                     Event Bus                       │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! │       ↓                                                     │
//! │  MonitorSnapshot  →  panels / charts / map (external)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod alarm;
pub mod config;
pub mod core;
pub mod events;
pub mod monitor;
pub mod source;
pub mod telemetry;

// Re-exports for convenience
pub use alarm::{AlarmSink, NullAlarm, TracingAlarm};
pub use config::Config;
pub use self::core::{EventBus, MonitorEngine, MonitorSnapshot};
pub use events::{Event, EventClass, EventHistory, EventId};
pub use monitor::{MonitorState, SystemStatus};
pub use source::{BackendPoller, EventSimulator, EventSource};

/// CityHear version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CityHear name
pub const NAME: &str = "CityHear";
