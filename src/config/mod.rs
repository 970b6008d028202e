// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Application version
    pub version: String,

    /// Log level
    pub log_level: String,

    /// Run against the simulated event source instead of a backend
    pub demo_mode: bool,

    /// Simulated source configuration
    pub source: SourceConfig,

    /// Alerting and reconciliation configuration
    pub alerting: AlertingConfig,

    /// Telemetry sampling configuration
    pub telemetry: TelemetryConfig,

    /// Backend polling configuration
    pub backend: BackendConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "CityHear".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            demo_mode: true,
            source: SourceConfig::default(),
            alerting: AlertingConfig::default(),
            telemetry: TelemetryConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("cityhear"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Simulated event source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Minimum inter-arrival gap in milliseconds
    pub min_gap_ms: u64,

    /// Maximum inter-arrival gap in milliseconds
    pub max_gap_ms: u64,

    /// Base latitude incidents are scattered around
    pub base_lat: f64,

    /// Base longitude incidents are scattered around
    pub base_lng: f64,

    /// Maximum coordinate offset applied per event
    pub location_jitter: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_gap_ms: 2000,
            max_gap_ms: 6000,
            base_lat: 17.3850,
            base_lng: 78.4867,
            location_jitter: 0.01,
        }
    }
}

/// Alerting and reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Maximum events retained in history
    pub history_capacity: usize,

    /// Seconds an emergency event holds the current-event slot
    pub hold_window_secs: u64,

    /// Seconds the console dwells in Alert before reverting
    pub alert_dwell_secs: u64,

    /// Play the audible alarm loop for unacknowledged emergencies
    pub alarm_sound: bool,
}

impl AlertingConfig {
    pub fn hold_window(&self) -> Duration {
        Duration::from_secs(self.hold_window_secs)
    }

    pub fn alert_dwell(&self) -> Duration {
        Duration::from_secs(self.alert_dwell_secs)
    }
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            hold_window_secs: 15,
            alert_dwell_secs: 5,
            alarm_sound: true,
        }
    }
}

/// Telemetry sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Waveform buffer length in samples
    pub waveform_len: usize,

    /// Fast sampler period in milliseconds (waveform / decibel)
    pub audio_interval_ms: u64,

    /// Medium sampler period in milliseconds (host health)
    pub health_interval_ms: u64,

    /// Reported capture rate in Hz
    pub sample_rate: u32,
}

impl TelemetryConfig {
    pub fn audio_interval(&self) -> Duration {
        Duration::from_millis(self.audio_interval_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            waveform_len: 100,
            audio_interval_ms: 50,
            health_interval_ms: 1000,
            sample_rate: 44100,
        }
    }
}

/// Backend polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Poll the backend instead of running the simulator
    pub enabled: bool,

    /// Backend origin, also used to resolve relative evidence paths
    pub base_url: String,

    /// Poll period in milliseconds
    pub poll_interval_ms: u64,
}

impl BackendConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:5050".to_string(),
            poll_interval_ms: 200,
        }
    }
}
