// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Audible alarm gating for unacknowledged emergencies.
//!
//! The alarm condition is level-triggered: the engine pushes the current
//! level after every relevant state change, not just on edges. Sinks are
//! best-effort — a platform refusing playback is logged and ignored, it
//! never feeds back into alert state.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

/// Receives the alarm condition. Implementations start the audible loop
/// while the level is true and stop it the moment it goes false.
pub trait AlarmSink: Send + Sync {
    /// Called with the current condition on every relevant state change.
    /// Repeated calls with the same level are expected.
    fn set_active(&self, active: bool);
}

/// Logs alarm transitions; stands in for the platform audio loop.
#[derive(Debug, Default)]
pub struct TracingAlarm {
    engaged: AtomicBool,
}

impl AlarmSink for TracingAlarm {
    fn set_active(&self, active: bool) {
        let was = self.engaged.swap(active, Ordering::SeqCst);
        if was == active {
            return;
        }
        if active {
            warn!("🔊 Unacknowledged emergency - alarm loop engaged");
        } else {
            info!("Alarm loop silenced");
        }
    }
}

/// Discards alarm conditions entirely (alarm sound disabled, CI).
#[derive(Debug, Default)]
pub struct NullAlarm;

impl AlarmSink for NullAlarm {
    fn set_active(&self, _active: bool) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records every level change for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingAlarm {
        pub transitions: Arc<Mutex<Vec<bool>>>,
        engaged: Arc<AtomicBool>,
    }

    impl RecordingAlarm {
        pub fn is_engaged(&self) -> bool {
            self.engaged.load(Ordering::SeqCst)
        }
    }

    impl AlarmSink for RecordingAlarm {
        fn set_active(&self, active: bool) {
            let was = self.engaged.swap(active, Ordering::SeqCst);
            if was != active {
                self.transitions.lock().push(active);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingAlarm;
    use super::*;

    #[test]
    fn test_level_calls_collapse_to_edges() {
        let alarm = RecordingAlarm::default();
        alarm.set_active(false);
        alarm.set_active(true);
        alarm.set_active(true);
        alarm.set_active(false);
        alarm.set_active(false);

        assert_eq!(*alarm.transitions.lock(), vec![true, false]);
        assert!(!alarm.is_engaged());
    }
}
