// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Monitor engine - drives sources, timers, and the reconciliation core.
//!
//! Every arriving event is one atomic logical step: history append, display
//! resolution, and status escalation happen under a single state lock
//! before any timer is armed. Timers follow the cancel-before-replace
//! discipline for the hold window and are generation-checked on fire, so a
//! stale callback can never clobber newer state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::alarm::AlarmSink;
use crate::config::Config;
use crate::core::scheduler::{self, TimerHandle};
use crate::core::{EventBus, MonitorSnapshot};
use crate::events::{Event, EventId, Evidence};
use crate::monitor::{MonitorState, SystemStatus, TimerRequest};
use crate::source::EventSource;
use crate::telemetry::{AudioTelemetry, HardwareStatus, HealthSampler, SystemHealth};

/// Builds a fresh event source each time the system starts listening.
pub type SourceFactory = Box<dyn Fn() -> Box<dyn EventSource> + Send + Sync>;

/// Coordinates the event source, samplers, timers, and reconciliation
/// state. Cheap to clone; all clones share the same engine.
#[derive(Clone)]
pub struct MonitorEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: Arc<Config>,
    state: RwLock<MonitorState>,
    audio: RwLock<AudioTelemetry>,
    health: RwLock<SystemHealth>,
    health_sampler: Mutex<HealthSampler>,
    hardware: RwLock<HardwareStatus>,
    source_factory: Mutex<Option<SourceFactory>>,
    hold_timer: Mutex<Option<TimerHandle>>,
    dwell_timer: Mutex<Option<TimerHandle>>,
    /// Samplers plus the source loop; cancelled together on stop
    tasks: Mutex<Vec<TimerHandle>>,
    alarm: Box<dyn AlarmSink>,
    alarm_active: AtomicBool,
    bus: Arc<EventBus>,
}

impl MonitorEngine {
    pub fn new(config: Config, alarm: Box<dyn AlarmSink>) -> Self {
        let audio = AudioTelemetry::new(
            config.telemetry.waveform_len,
            config.telemetry.sample_rate,
        );
        let state = MonitorState::new(config.alerting.history_capacity);

        Self {
            inner: Arc::new(EngineInner {
                config: Arc::new(config),
                state: RwLock::new(state),
                audio: RwLock::new(audio),
                health: RwLock::new(SystemHealth::default()),
                health_sampler: Mutex::new(HealthSampler::new()),
                hardware: RwLock::new(HardwareStatus::default()),
                source_factory: Mutex::new(None),
                hold_timer: Mutex::new(None),
                dwell_timer: Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
                alarm,
                alarm_active: AtomicBool::new(false),
                bus: Arc::new(EventBus::new(256)),
            }),
        }
    }

    /// Install the source used in demo mode. Networked deployments leave
    /// this unset and feed the engine through the backend poller instead.
    pub fn set_source(&self, factory: SourceFactory) {
        *self.inner.source_factory.lock() = Some(factory);
    }

    pub fn bus(&self) -> Arc<EventBus> {
        self.inner.bus.clone()
    }

    pub fn status(&self) -> SystemStatus {
        self.inner.state.read().status()
    }

    /// Start listening: arms the samplers and the source loop.
    /// No-op unless currently `Offline`.
    pub fn start(&self) -> bool {
        if !self.inner.state.write().start() {
            return false;
        }

        let mut tasks = self.inner.tasks.lock();

        let engine = self.clone();
        tasks.push(scheduler::schedule_repeating(
            self.inner.config.telemetry.audio_interval(),
            move || engine.sample_audio(),
        ));

        let engine = self.clone();
        tasks.push(scheduler::schedule_repeating(
            self.inner.config.telemetry.health_interval(),
            move || engine.sample_health(),
        ));

        if let Some(task) = self.spawn_source() {
            tasks.push(task);
        }
        drop(tasks);

        self.inner.hardware.write().mic_active = true;
        info!("Monitor listening");
        self.inner.bus.publish_status(SystemStatus::Listening);
        true
    }

    /// Stop listening: cancels all periodic activities and pending timers,
    /// clears the current event, and resets telemetry to baseline. History
    /// and acknowledgment state are kept.
    pub fn stop(&self) {
        for task in self.inner.tasks.lock().drain(..) {
            task.cancel();
        }
        if let Some(timer) = self.inner.hold_timer.lock().take() {
            timer.cancel();
        }
        if let Some(timer) = self.inner.dwell_timer.lock().take() {
            timer.cancel();
        }

        self.inner.state.write().stop();
        self.inner.audio.write().reset();
        self.inner.health.write().idle();
        self.inner.hardware.write().mic_active = false;

        self.refresh_alarm();
        info!("Monitor stopped");
        self.inner.bus.publish_status(SystemStatus::Offline);
    }

    /// Flip between `Offline` and listening, like the console power switch.
    pub fn toggle(&self) {
        if self.status() == SystemStatus::Offline {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Feed one classified event through the reconciliation core.
    pub fn ingest(&self, event: Event) {
        debug!(
            "Event received: {} #{} ({:.1}%)",
            event.class.label(),
            event.id.0,
            event.confidence
        );

        let (before, after, timers) = {
            let mut state = self.inner.state.write();
            let before = state.status();
            let timers = state.ingest(event.clone());
            (before, state.status(), timers)
        };

        self.apply_timers(timers);
        self.refresh_alarm();
        self.inner.bus.publish_detection(event);
        if before != after {
            info!("Status escalated to {:?}", after);
            self.inner.bus.publish_status(after);
        }
    }

    /// Apply a backend-authoritative history snapshot (networked mode).
    pub fn sync_history(&self, events: Vec<Event>) {
        let (before, after, timers) = {
            let mut state = self.inner.state.write();
            let before = state.status();
            let timers = state.sync_history(events);
            (before, state.status(), timers)
        };

        self.apply_timers(timers);
        self.refresh_alarm();
        if before != after {
            self.inner.bus.publish_status(after);
        }
    }

    /// Operator viewed an event. Idempotent per id.
    pub fn acknowledge(&self, id: EventId) {
        self.inner.state.write().acknowledge(id);
        self.refresh_alarm();
    }

    /// Open an event's evidence view: resolves its links against the
    /// backend origin and acknowledges it.
    pub fn open_evidence(&self, id: EventId) -> Option<Evidence> {
        let evidence = {
            let state = self.inner.state.read();
            state
                .history()
                .get(id)
                .map(|event| event.evidence(&self.inner.config.backend.base_url))
        };
        if evidence.is_some() {
            self.acknowledge(id);
        }
        evidence
    }

    /// Externally-fed decibel level from the backend.
    pub fn set_audio_level(&self, decibel: f32) {
        self.inner.audio.write().set_level(decibel);
    }

    /// Hardware flags from the backend; `mic_active` drives the
    /// `Offline`/`Listening` transition in networked mode.
    pub fn set_hardware(&self, hardware: HardwareStatus) {
        let status = self.status();
        *self.inner.hardware.write() = hardware;

        if hardware.mic_active && status == SystemStatus::Offline {
            self.start();
        } else if !hardware.mic_active && status != SystemStatus::Offline {
            self.stop();
        }
    }

    /// Read-only view of everything, taken on the render cadence.
    pub fn snapshot(&self) -> MonitorSnapshot {
        let state = self.inner.state.read();
        MonitorSnapshot {
            status: state.status(),
            current_event: state.current_event().cloned(),
            history: state.history().to_vec(),
            unacknowledged: state.is_unacknowledged(),
            hardware: *self.inner.hardware.read(),
            audio: self.inner.audio.read().frame(),
            health: self.inner.health.read().clone(),
        }
    }

    fn spawn_source(&self) -> Option<TimerHandle> {
        let factory = self.inner.source_factory.lock();
        let mut source = factory.as_ref()?();
        let engine = self.clone();
        let task = tokio::spawn(async move {
            loop {
                let event = source.next_event().await;
                engine.ingest(event);
            }
        });
        Some(TimerHandle::new(task))
    }

    fn apply_timers(&self, requests: Vec<TimerRequest>) {
        for request in requests {
            match request {
                TimerRequest::Hold(generation) => {
                    let engine = self.clone();
                    let handle = scheduler::schedule_once(
                        self.inner.config.alerting.hold_window(),
                        move || engine.hold_expired(generation),
                    );
                    // Cancel-before-replace: a superseded hold must never
                    // clear a newer event
                    if let Some(prev) = self.inner.hold_timer.lock().replace(handle) {
                        prev.cancel();
                    }
                }
                TimerRequest::Dwell(generation) => {
                    let engine = self.clone();
                    let handle = scheduler::schedule_once(
                        self.inner.config.alerting.alert_dwell(),
                        move || engine.dwell_expired(generation),
                    );
                    if let Some(prev) = self.inner.dwell_timer.lock().replace(handle) {
                        prev.cancel();
                    }
                }
            }
        }
    }

    fn hold_expired(&self, generation: u64) {
        if self.inner.state.write().hold_expired(generation) {
            debug!("Hold window elapsed, current event released");
        }
    }

    fn dwell_expired(&self, generation: u64) {
        if self.inner.state.write().dwell_expired(generation) {
            info!("Alert dwell elapsed, back to listening");
            self.inner.bus.publish_status(SystemStatus::Listening);
        }
    }

    /// Re-evaluate the level-triggered alarm condition. Called after every
    /// state mutation; the sink sees the level each time, the bus only
    /// edges.
    fn refresh_alarm(&self) {
        let level = self.inner.state.read().is_unacknowledged();
        let was = self.inner.alarm_active.swap(level, Ordering::SeqCst);
        self.inner.alarm.set_active(level);
        if was != level {
            self.inner.bus.publish_alarm(level);
        }
    }

    fn sample_audio(&self) {
        if self.status() == SystemStatus::Offline {
            return;
        }
        let externally_fed = self.inner.config.backend.enabled;
        self.inner.audio.write().advance(externally_fed);
    }

    fn sample_health(&self) {
        if self.status() == SystemStatus::Offline {
            return;
        }
        let health = self.inner.health_sampler.lock().sample();
        *self.inner.health.write() = health;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::testing::RecordingAlarm;
    use crate::alarm::NullAlarm;
    use crate::events::EventClass;
    use std::time::Duration;

    fn test_engine() -> MonitorEngine {
        let mut config = Config::default();
        config.demo_mode = true;
        config.backend.enabled = false;
        MonitorEngine::new(config, Box::new(NullAlarm))
    }

    fn event(id: u64, class: EventClass) -> Event {
        Event {
            id: EventId(id),
            class,
            confidence: 93.2,
            timestamp: "2026-08-08 12:00:00".to_string(),
            location: None,
            video_url: None,
            map_link: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_uncontested_hold_releases_after_window() {
        let engine = test_engine();
        engine.start();

        engine.ingest(event(1, EventClass::Crash));
        assert_eq!(engine.snapshot().current_event.unwrap().id, EventId(1));

        tokio::time::sleep(Duration::from_secs(14)).await;
        assert!(engine.snapshot().current_event.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(engine.snapshot().current_event.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_preempting_emergency_restarts_hold() {
        let engine = test_engine();
        engine.start();

        engine.ingest(event(1, EventClass::Crash));
        tokio::time::sleep(Duration::from_secs(10)).await;
        engine.ingest(event(2, EventClass::Gun));

        // The first event's timer would have fired at t=15; it was
        // cancelled and its generation is stale either way
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.snapshot().current_event.unwrap().id, EventId(2));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(engine.snapshot().current_event.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_normal_cannot_displace_held_event() {
        let engine = test_engine();
        engine.start();

        engine.ingest(event(1, EventClass::Scream));
        tokio::time::sleep(Duration::from_secs(1)).await;
        engine.ingest(event(2, EventClass::Normal));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.current_event.unwrap().id, EventId(1));
        assert_eq!(snapshot.history.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dwell_reverts_to_listening() {
        let engine = test_engine();
        engine.start();

        engine.ingest(event(1, EventClass::Explosion));
        assert_eq!(engine.status(), SystemStatus::Alert);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(engine.status(), SystemStatus::Alert);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.status(), SystemStatus::Listening);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_extends_alert() {
        let engine = test_engine();
        engine.start();

        engine.ingest(event(1, EventClass::Crash));
        tokio::time::sleep(Duration::from_secs(3)).await;
        engine.ingest(event(2, EventClass::Crash));

        // First dwell would have expired at t=5
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(engine.status(), SystemStatus::Alert);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(engine.status(), SystemStatus::Listening);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_clears_current_but_keeps_history() {
        let engine = test_engine();
        engine.start();

        engine.ingest(event(1, EventClass::Gun));
        engine.ingest(event(2, EventClass::Normal));
        engine.stop();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.status, SystemStatus::Offline);
        assert!(snapshot.current_event.is_none());
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.audio.decibel, 0.0);

        // Cancelled timers stay quiet
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(engine.status(), SystemStatus::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_alarm_follows_acknowledgment() {
        let mut config = Config::default();
        config.demo_mode = true;
        config.backend.enabled = false;
        let alarm = RecordingAlarm::default();
        let engine = MonitorEngine::new(config, Box::new(alarm.clone()));
        engine.start();

        engine.ingest(event(1, EventClass::Scream));
        assert!(alarm.is_engaged());

        engine.acknowledge(EventId(1));
        assert!(!alarm.is_engaged());

        engine.ingest(event(2, EventClass::Normal));
        assert!(!alarm.is_engaged());

        engine.ingest(event(3, EventClass::Gun));
        assert!(alarm.is_engaged());

        assert_eq!(*alarm.transitions.lock(), vec![true, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_evidence_acknowledges() {
        let engine = test_engine();
        engine.start();

        let mut ev = event(1, EventClass::Crash);
        ev.video_url = Some("/uploads/clip.mp4".to_string());
        engine.ingest(ev);
        assert!(engine.snapshot().unacknowledged);

        let evidence = engine.open_evidence(EventId(1)).unwrap();
        assert!(evidence.video_url.unwrap().ends_with("/uploads/clip.mp4"));
        assert!(!engine.snapshot().unacknowledged);

        // Unknown ids resolve to nothing and acknowledge nothing
        assert!(engine.open_evidence(EventId(999)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mic_flag_drives_networked_status() {
        let engine = test_engine();

        engine.set_hardware(HardwareStatus {
            mic_active: true,
            camera_active: true,
        });
        assert_eq!(engine.status(), SystemStatus::Listening);

        engine.set_hardware(HardwareStatus {
            mic_active: false,
            camera_active: true,
        });
        assert_eq!(engine.status(), SystemStatus::Offline);
    }
}
