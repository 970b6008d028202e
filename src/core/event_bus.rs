// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Event bus for inter-component notification

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::events::Event;
use crate::monitor::SystemStatus;

/// Notice kinds published on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    Detection,
    StatusChange,
    Alarm,
}

/// Generic notice wrapper with a monotonic id
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub timestamp: DateTime<Utc>,
    pub payload: NoticePayload,
}

#[derive(Debug, Clone, Serialize)]
pub enum NoticePayload {
    Detection(Event),
    Status(SystemStatus),
    Alarm { active: bool },
}

/// Central bus for pub/sub notification of downstream consumers.
///
/// Rendering layers subscribe here (or just poll snapshots); nothing in
/// the reconciliation core depends on anyone listening.
pub struct EventBus {
    detection_tx: broadcast::Sender<Event>,
    notice_tx: broadcast::Sender<Notice>,
    counter: std::sync::atomic::AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (detection_tx, _) = broadcast::channel(capacity);
        let (notice_tx, _) = broadcast::channel(capacity);

        Self {
            detection_tx,
            notice_tx,
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn publish_detection(&self, event: Event) {
        let _ = self.detection_tx.send(event.clone());
        self.publish(NoticeKind::Detection, NoticePayload::Detection(event));
    }

    pub fn publish_status(&self, status: SystemStatus) {
        self.publish(NoticeKind::StatusChange, NoticePayload::Status(status));
    }

    pub fn publish_alarm(&self, active: bool) {
        self.publish(NoticeKind::Alarm, NoticePayload::Alarm { active });
    }

    fn publish(&self, kind: NoticeKind, payload: NoticePayload) {
        let id = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let notice = Notice {
            id,
            kind,
            timestamp: Utc::now(),
            payload,
        };
        let _ = self.notice_tx.send(notice);
    }

    pub fn subscribe_detections(&self) -> broadcast::Receiver<Event> {
        self.detection_tx.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }
}
