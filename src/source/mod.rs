//! Event sources - the demo simulator and the backend poller.
//!
//! A source is anything that emits classified [`Event`]s at some rate while
//! the monitor is listening. The engine drives a source in its own task and
//! cancels that task on stop, so implementations just produce the next
//! event at their own cadence.

mod poller;
mod simulator;

pub use poller::{BackendPoller, PollError};
pub use simulator::EventSimulator;

use async_trait::async_trait;

use crate::events::Event;

/// A producer of classified detection events.
#[async_trait]
pub trait EventSource: Send {
    /// Wait out the source's cadence and produce the next event.
    async fn next_event(&mut self) -> Event;
}
