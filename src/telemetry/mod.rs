// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Live audio and host-health telemetry.
//!
//! Two cadences feed the console: a fast waveform/decibel sampler and a
//! medium host-health sampler. Both are rendering fodder only; nothing in
//! the reconciliation core reads them.

use std::collections::VecDeque;

use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Peak amplitude the waveform is clamped to; maps to 100 dB on the meter.
const AMPLITUDE_CEILING: f32 = 300.0;

/// Hardware flags reported by the appliance
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HardwareStatus {
    pub mic_active: bool,
    pub camera_active: bool,
}

/// One render-ready frame of audio telemetry
#[derive(Debug, Clone, Serialize)]
pub struct AudioFrame {
    /// Scrolling amplitude samples, oldest first
    pub waveform: Vec<f32>,
    /// Instantaneous level, 0-100 dB scale
    pub decibel: f32,
    /// Capture rate in Hz
    pub sample_rate: u32,
}

/// Scrolling waveform buffer plus instantaneous decibel estimate.
///
/// In demo mode each tick synthesizes a fresh amplitude sample and derives
/// the decibel level from it. In networked mode the decibel level is fed
/// externally by the backend poller and each tick synthesizes waveform
/// noise scaled to that level.
pub struct AudioTelemetry {
    waveform: VecDeque<f32>,
    capacity: usize,
    decibel: f32,
    sample_rate: u32,
    rng: StdRng,
    noise: Normal<f32>,
}

impl AudioTelemetry {
    pub fn new(capacity: usize, sample_rate: u32) -> Self {
        Self {
            waveform: std::iter::repeat(0.0).take(capacity).collect(),
            capacity,
            decibel: 0.0,
            sample_rate,
            rng: StdRng::from_entropy(),
            noise: Normal::new(0.0, 25.0).unwrap(),
        }
    }

    /// Advance the buffer by one sample.
    pub fn advance(&mut self, externally_fed: bool) {
        let value = if externally_fed {
            // Shape noise to the backend-reported level so the trace goes
            // flat when the street is quiet
            let scale = (self.decibel / 20.0).max(0.0);
            self.rng.sample(self.noise) * scale
        } else {
            let base = self.rng.gen_range(-200.0..200.0);
            let sample =
                (base + self.rng.sample(self.noise)).clamp(-AMPLITUDE_CEILING, AMPLITUDE_CEILING);
            self.decibel = (sample.abs() / AMPLITUDE_CEILING * 100.0).clamp(0.0, 100.0);
            sample
        };

        self.waveform.push_back(value);
        while self.waveform.len() > self.capacity {
            self.waveform.pop_front();
        }
    }

    /// Externally-fed decibel level (networked mode). Absent readings just
    /// never call this, keeping the last value.
    pub fn set_level(&mut self, decibel: f32) {
        self.decibel = decibel.clamp(0.0, 100.0);
    }

    pub fn decibel(&self) -> f32 {
        self.decibel
    }

    /// Flatten everything back to baseline (system stop).
    pub fn reset(&mut self) {
        self.waveform = std::iter::repeat(0.0).take(self.capacity).collect();
        self.decibel = 0.0;
    }

    pub fn frame(&self) -> AudioFrame {
        AudioFrame {
            waveform: self.waveform.iter().copied().collect(),
            decibel: self.decibel,
            sample_rate: self.sample_rate,
        }
    }
}

/// Coarse host health readings on the medium cadence
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    /// CPU usage percent
    pub cpu: f32,
    /// Used memory in MB
    pub memory_mb: u64,
    /// Estimated round-trip latency in ms
    pub latency_ms: u32,
}

impl SystemHealth {
    /// Baseline shown while the system is stopped. Memory stays at its
    /// last reading.
    pub fn idle(&mut self) {
        self.cpu = 2.0;
        self.latency_ms = 0;
    }
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self {
            cpu: 2.0,
            memory_mb: 0,
            latency_ms: 0,
        }
    }
}

/// Samples process/host metrics.
///
/// CPU and memory come from the host; latency is simulated until the
/// backend reports a real round-trip figure.
pub struct HealthSampler {
    sys: System,
    rng: StdRng,
}

impl HealthSampler {
    pub fn new() -> Self {
        Self {
            sys: System::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn sample(&mut self) -> SystemHealth {
        self.sys.refresh_cpu();
        self.sys.refresh_memory();

        SystemHealth {
            cpu: self.sys.global_cpu_info().cpu_usage(),
            memory_mb: self.sys.used_memory() / (1024 * 1024),
            latency_ms: self.rng.gen_range(8..=25),
        }
    }
}

impl Default for HealthSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_length_is_fixed() {
        let mut audio = AudioTelemetry::new(100, 44100);
        for _ in 0..250 {
            audio.advance(false);
            assert_eq!(audio.frame().waveform.len(), 100);
        }
    }

    #[test]
    fn test_decibel_stays_in_range() {
        let mut audio = AudioTelemetry::new(100, 44100);
        for _ in 0..500 {
            audio.advance(false);
            let db = audio.decibel();
            assert!((0.0..=100.0).contains(&db), "decibel out of range: {}", db);
        }
    }

    #[test]
    fn test_reset_returns_to_baseline() {
        let mut audio = AudioTelemetry::new(50, 44100);
        for _ in 0..50 {
            audio.advance(false);
        }
        audio.reset();

        let frame = audio.frame();
        assert_eq!(frame.decibel, 0.0);
        assert!(frame.waveform.iter().all(|&v| v == 0.0));
        assert_eq!(frame.waveform.len(), 50);
    }

    #[test]
    fn test_external_level_is_clamped_and_kept() {
        let mut audio = AudioTelemetry::new(50, 44100);
        audio.set_level(180.0);
        assert_eq!(audio.decibel(), 100.0);

        // Fed mode must not overwrite the externally supplied level
        audio.advance(true);
        assert_eq!(audio.decibel(), 100.0);
    }

    #[test]
    fn test_fed_waveform_flatlines_at_zero_level() {
        let mut audio = AudioTelemetry::new(50, 44100);
        audio.set_level(0.0);
        for _ in 0..50 {
            audio.advance(true);
        }
        assert!(audio.frame().waveform.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_health_sampler_produces_plausible_values() {
        let mut sampler = HealthSampler::new();
        let health = sampler.sample();
        assert!((8..=25).contains(&health.latency_ms));
    }
}
