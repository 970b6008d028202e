// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! Event model for classified audio detections

mod history;

pub use history::EventHistory;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Classes emitted by the audio classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventClass {
    /// Ordinary street noise, no operator action needed
    Normal,
    /// Vehicle collision signature
    Crash,
    /// Blast / detonation signature
    Explosion,
    /// Human scream signature
    Scream,
    /// Gunshot signature
    Gun,
}

impl EventClass {
    /// Everything except `Normal` demands operator attention.
    pub fn is_emergency(self) -> bool {
        !matches!(self, EventClass::Normal)
    }

    /// Classes that force the console into `Alert` status.
    ///
    /// `Scream` stays out of this set: it holds the current-event slot and
    /// drives the alarm loop, but does not escalate system status.
    pub fn is_severe(self) -> bool {
        matches!(
            self,
            EventClass::Crash | EventClass::Explosion | EventClass::Gun
        )
    }

    /// Display label, matching the backend wire format.
    pub fn label(self) -> &'static str {
        match self {
            EventClass::Normal => "Normal",
            EventClass::Crash => "Crash",
            EventClass::Explosion => "Explosion",
            EventClass::Scream => "Scream",
            EventClass::Gun => "Gun",
        }
    }

    /// Parse a wire label, case-insensitive. Returns `None` for labels this
    /// build does not know.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "normal" => Some(EventClass::Normal),
            "crash" => Some(EventClass::Crash),
            "explosion" => Some(EventClass::Explosion),
            "scream" => Some(EventClass::Scream),
            "gun" | "gunshot" => Some(EventClass::Gun),
            _ => None,
        }
    }
}

/// Opaque event identifier.
///
/// Monotonically increasing within a session: the simulator uses the
/// millisecond clock, the backend a row counter. Identity comparison is all
/// the reconciliation logic ever does with it, ordering only decides
/// freshness during a history sync.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EventId(pub u64);

/// Geographic position of an incident
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Links shown when an operator opens an event's evidence view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Video clip URL, already resolved against the backend origin
    pub video_url: Option<String>,
    /// External map deep link
    pub map_link: Option<String>,
}

/// A single classified detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub class: EventClass,
    /// Classifier confidence in percent, one decimal of precision
    pub confidence: f64,
    /// Raw timestamp as produced by the source; see
    /// [`formatted_timestamp`](Self::formatted_timestamp)
    pub timestamp: String,
    /// Incident position; events without one are not mappable
    pub location: Option<GeoPoint>,
    /// Evidence clip path, relative to the backend origin
    #[serde(default)]
    pub video_url: Option<String>,
    /// External map deep link
    #[serde(default)]
    pub map_link: Option<String>,
}

impl Event {
    pub fn is_emergency(&self) -> bool {
        self.class.is_emergency()
    }

    /// Timestamp for display, `dd/mm/yy HH:MM:SS`.
    ///
    /// Tries RFC 3339 first, then the backend's plain format. Anything that
    /// fails to parse is shown raw rather than failing the render.
    pub fn formatted_timestamp(&self) -> String {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%d %H:%M:%S"))
            .map(|dt| dt.format("%d/%m/%y %H:%M:%S").to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }

    /// Evidence links with the video path resolved against `origin`.
    pub fn evidence(&self, origin: &str) -> Evidence {
        let video_url = self.video_url.as_ref().map(|path| {
            if path.starts_with("http://") || path.starts_with("https://") {
                path.clone()
            } else {
                format!("{}{}", origin.trim_end_matches('/'), path)
            }
        });

        Evidence {
            video_url,
            map_link: self.map_link.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: &str) -> Event {
        Event {
            id: EventId(1),
            class: EventClass::Crash,
            confidence: 91.5,
            timestamp: timestamp.to_string(),
            location: None,
            video_url: None,
            map_link: None,
        }
    }

    #[test]
    fn test_severe_subset_excludes_scream() {
        assert!(EventClass::Scream.is_emergency());
        assert!(!EventClass::Scream.is_severe());
        assert!(EventClass::Gun.is_severe());
        assert!(!EventClass::Normal.is_emergency());
    }

    #[test]
    fn test_label_roundtrip() {
        for class in [
            EventClass::Normal,
            EventClass::Crash,
            EventClass::Explosion,
            EventClass::Scream,
            EventClass::Gun,
        ] {
            assert_eq!(EventClass::from_label(class.label()), Some(class));
        }
        assert_eq!(EventClass::from_label("GUNSHOT"), Some(EventClass::Gun));
        assert_eq!(EventClass::from_label("siren"), None);
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            event("2026-08-08 14:03:27").formatted_timestamp(),
            "08/08/26 14:03:27"
        );
        assert_eq!(
            event("2026-08-08T14:03:27+00:00").formatted_timestamp(),
            "08/08/26 14:03:27"
        );
    }

    #[test]
    fn test_malformed_timestamp_shown_raw() {
        assert_eq!(event("14:03:27").formatted_timestamp(), "14:03:27");
        assert_eq!(event("???").formatted_timestamp(), "???");
    }

    #[test]
    fn test_evidence_resolution() {
        let mut ev = event("2026-08-08 14:03:27");
        ev.video_url = Some("/uploads/20260808_Crash.mp4".to_string());
        ev.map_link = Some("https://maps.example/q=17.38,78.48".to_string());

        let evidence = ev.evidence("http://localhost:5050/");
        assert_eq!(
            evidence.video_url.as_deref(),
            Some("http://localhost:5050/uploads/20260808_Crash.mp4")
        );
        assert!(evidence.map_link.is_some());

        ev.video_url = Some("https://cdn.example/clip.mp4".to_string());
        let evidence = ev.evidence("http://localhost:5050");
        assert_eq!(
            evidence.video_url.as_deref(),
            Some("https://cdn.example/clip.mp4")
        );
    }
}
