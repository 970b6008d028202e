// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Simulated event generator for demo mode

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::prelude::*;

use super::EventSource;
use crate::config::SourceConfig;
use crate::events::{Event, EventClass, EventId, GeoPoint};

/// Generates classified events at irregular 2-6 s intervals with a fixed
/// class distribution, jittered around a base coordinate.
pub struct EventSimulator {
    rng: StdRng,
    base: GeoPoint,
    jitter: f64,
    min_gap: Duration,
    max_gap: Duration,
}

impl EventSimulator {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            base: GeoPoint {
                lat: config.base_lat,
                lng: config.base_lng,
            },
            jitter: config.location_jitter,
            min_gap: Duration::from_millis(config.min_gap_ms),
            max_gap: Duration::from_millis(config.max_gap_ms),
        }
    }

    /// Class distribution: 55% Normal, 15% Crash, 15% Scream,
    /// 10% Explosion, 5% Gun, as cumulative thresholds over [0,1).
    fn class_for_roll(roll: f64) -> EventClass {
        if roll > 0.95 {
            EventClass::Gun
        } else if roll > 0.85 {
            EventClass::Explosion
        } else if roll > 0.70 {
            EventClass::Scream
        } else if roll > 0.55 {
            EventClass::Crash
        } else {
            EventClass::Normal
        }
    }

    fn next_gap(&mut self) -> Duration {
        self.rng.gen_range(self.min_gap..=self.max_gap)
    }

    fn make_event(&mut self) -> Event {
        let class = Self::class_for_roll(self.rng.gen::<f64>());
        let confidence = (self.rng.gen_range(70.0..98.0) * 10.0_f64).round() / 10.0;
        let now = Utc::now();

        Event {
            id: EventId(now.timestamp_millis() as u64),
            class,
            confidence,
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            location: Some(GeoPoint {
                lat: self.base.lat + self.rng.gen_range(-self.jitter..self.jitter),
                lng: self.base.lng + self.rng.gen_range(-self.jitter..self.jitter),
            }),
            video_url: None,
            map_link: None,
        }
    }
}

#[async_trait]
impl EventSource for EventSimulator {
    async fn next_event(&mut self) -> Event {
        tokio::time::sleep(self.next_gap()).await;
        self.make_event()
    }
}
