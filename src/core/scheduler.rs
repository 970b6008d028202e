// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Cancellable timers for hold windows, dwell windows, and samplers.
//!
//! Timers are best-effort: a callback firing after its guarded state has
//! moved on must be treated as a no-op by the callee. Callers tag callbacks
//! with a generation and check it on fire; cancellation here is the second
//! line of defense, not the correctness mechanism.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Handle to a scheduled task. Dropping the handle does not cancel it;
/// call [`cancel`](Self::cancel).
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Abort the task. Safe to call after it already ran.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Run `callback` once after `delay`.
pub fn schedule_once<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        callback();
    });
    debug!("Scheduled one-shot timer for {:?}", delay);
    TimerHandle::new(task)
}

/// Run `callback` on a fixed period until cancelled. Missed ticks are
/// skipped rather than burst.
pub fn schedule_repeating<F>(period: Duration, mut callback: F) -> TimerHandle
where
    F: FnMut() + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            callback();
        }
    });
    TimerHandle::new(task)
}
