// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Backend poller for networked mode.
//!
//! Polls `/api/status` and `/api/events` on a fixed cadence. The backend is
//! authoritative for history; the reconciliation core runs on whatever is
//! freshly polled. A failed cycle keeps the last-known state on screen and
//! the next tick simply tries again - no backoff, no user-facing error.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::BackendConfig;
use crate::core::MonitorEngine;
use crate::events::{Event, EventClass, EventId, GeoPoint};
use crate::telemetry::HardwareStatus;

/// A single poll cycle's failure. Swallowed by the loop.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// `/api/status` body
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    mic_active: bool,
    #[serde(default)]
    camera_active: bool,
    /// Absent readings keep the last externally-fed decibel value
    #[serde(default)]
    audio_level: Option<f32>,
}

/// One entry of the `/api/events` array
#[derive(Debug, Deserialize)]
struct WireEvent {
    id: u64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    map_link: Option<String>,
}

impl WireEvent {
    fn into_event(self) -> Event {
        let class = EventClass::from_label(&self.kind).unwrap_or_else(|| {
            debug!("Unknown event class '{}', treating as Normal", self.kind);
            EventClass::Normal
        });

        let location = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };

        Event {
            id: EventId(self.id),
            class,
            confidence: self.confidence,
            timestamp: self.timestamp,
            location,
            video_url: self.video_url,
            map_link: self.map_link,
        }
    }
}

/// Polls the detection backend and feeds the engine.
pub struct BackendPoller {
    client: Client,
    base_url: String,
    interval: Duration,
    engine: MonitorEngine,
}

impl BackendPoller {
    pub fn new(config: &BackendConfig, engine: MonitorEngine) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            interval: config.poll_interval(),
            engine,
        }
    }

    /// Poll until the task is cancelled.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = self.poll_once().await {
                // Transient by definition; the next tick retries
                debug!("Poll cycle failed: {}", e);
            }
        }
    }

    async fn poll_once(&self) -> Result<(), PollError> {
        let status: StatusBody = self
            .client
            .get(format!("{}/api/status", self.base_url))
            .send()
            .await?
            .json()
            .await?;

        self.engine.set_hardware(HardwareStatus {
            mic_active: status.mic_active,
            camera_active: status.camera_active,
        });
        if let Some(decibel) = status.audio_level {
            self.engine.set_audio_level(decibel);
        }

        let events: Vec<WireEvent> = self
            .client
            .get(format!("{}/api/events", self.base_url))
            .send()
            .await?
            .json()
            .await?;

        self.engine
            .sync_history(events.into_iter().map(WireEvent::into_event).collect());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_event_parses_backend_shape() {
        let json = r#"{
            "id": 3,
            "type": "Crash",
            "location": "junction-12",
            "timestamp": "2026-08-08 14:03:27",
            "video_url": "/uploads/20260808_140327_Crash.mp4",
            "map_link": "https://www.google.com/maps/search/?api=1&query=17.38,78.48",
            "lat": 17.3851,
            "lng": 78.4869,
            "confidence": 95
        }"#;

        let wire: WireEvent = serde_json::from_str(json).unwrap();
        let event = wire.into_event();

        assert_eq!(event.id, EventId(3));
        assert_eq!(event.class, EventClass::Crash);
        assert_eq!(event.confidence, 95.0);
        assert!(event.location.is_some());
        assert!(event.video_url.unwrap().starts_with("/uploads/"));
    }

    #[test]
    fn test_unknown_class_degrades_to_normal() {
        let json = r#"{"id": 7, "type": "Siren", "timestamp": "x"}"#;
        let event = serde_json::from_str::<WireEvent>(json).unwrap().into_event();
        assert_eq!(event.class, EventClass::Normal);
    }

    #[test]
    fn test_missing_fields_default() {
        let json = r#"{"id": 9}"#;
        let event = serde_json::from_str::<WireEvent>(json).unwrap().into_event();
        assert_eq!(event.class, EventClass::Normal);
        assert!(event.location.is_none());
        assert!(event.video_url.is_none());
        assert_eq!(event.timestamp, "");
    }

    #[test]
    fn test_status_body_tolerates_missing_audio_level() {
        let body: StatusBody =
            serde_json::from_str(r#"{"mic_active": true, "camera_active": false}"#).unwrap();
        assert!(body.mic_active);
        assert!(body.audio_level.is_none());
    }
}
