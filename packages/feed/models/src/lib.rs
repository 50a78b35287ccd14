#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw feed record, feed definition, and fetch status types.
//!
//! [`RawFeedRecord`] is the transient, unvalidated shape of a single
//! `GeoJSON` feature as read from the feed. It is consumed by the
//! normalizer, which produces [`quake_map_quake_models::EarthquakeEvent`]
//! values.

use chrono::{DateTime, Utc};
use quake_map_quake_models::FeedWindow;
use serde::{Deserialize, Serialize};

/// The magnitude field of a raw feature, before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum RawMagnitude {
    /// `mag` absent or `null`.
    #[default]
    Missing,
    /// A numeric value (may still be `NaN` when built programmatically).
    Number(f64),
    /// Present but not a number (e.g. a string).
    Invalid,
}

impl RawMagnitude {
    /// Classifies a JSON `mag` field.
    #[must_use]
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::Missing,
            Some(v) => v.as_f64().map_or(Self::Invalid, Self::Number),
        }
    }
}

/// A single feature from the feed, before validation.
///
/// Only the fields the normalizer consumes are kept. Coordinates that are
/// absent or not numeric are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedRecord {
    /// Feature id. Numbers are stringified.
    pub id: Option<String>,
    /// First GeoJSON coordinate.
    pub longitude: Option<f64>,
    /// Second GeoJSON coordinate.
    pub latitude: Option<f64>,
    /// Third GeoJSON coordinate, in kilometers.
    pub depth: Option<f64>,
    /// The `mag` property.
    pub magnitude: RawMagnitude,
    /// The `place` property.
    pub place: Option<String>,
    /// Epoch milliseconds.
    pub time_ms: Option<i64>,
    /// Event detail page.
    pub url: Option<String>,
    /// Numeric tsunami flag (`1` means flagged).
    pub tsunami: Option<i64>,
    /// "Did you feel it" report count.
    pub felt: Option<i64>,
    /// PAGER alert level.
    pub alert: Option<String>,
}

/// A feed endpoint for one time window, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDefinition {
    /// Which window this feed covers.
    pub window: FeedWindow,
    /// Human-readable name (e.g. "All earthquakes, past day").
    pub name: String,
    /// File name relative to the feed base URL (e.g. `"all_day.geojson"`).
    pub file: String,
}

impl FeedDefinition {
    /// Joins the feed file onto `base_url`.
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.file)
    }
}

/// Lifecycle state of the feed fetcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Fetching,
    /// The latest request completed.
    Success {
        /// When the data was applied.
        updated_at: DateTime<Utc>,
    },
    /// The latest request failed.
    Failed {
        /// Failure reason, surfaced verbatim (e.g. `"HTTP 503"`).
        reason: String,
    },
}

impl FetchStatus {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Fetching)
    }

    /// The failure reason, if the latest request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_raw_magnitude() {
        let number = serde_json::json!(4.2);
        let text = serde_json::json!("4.2");
        assert_eq!(RawMagnitude::from_json(None), RawMagnitude::Missing);
        assert_eq!(
            RawMagnitude::from_json(Some(&serde_json::Value::Null)),
            RawMagnitude::Missing
        );
        assert_eq!(
            RawMagnitude::from_json(Some(&number)),
            RawMagnitude::Number(4.2)
        );
        assert_eq!(RawMagnitude::from_json(Some(&text)), RawMagnitude::Invalid);
    }

    #[test]
    fn joins_feed_url_without_double_slash() {
        let def: FeedDefinition = toml::de::from_str(
            "window = \"week\"\nname = \"All earthquakes, past week\"\nfile = \"all_week.geojson\"\n",
        )
        .unwrap();
        assert_eq!(def.window, FeedWindow::Week);
        assert_eq!(def.url("https://example.test/feed/"), "https://example.test/feed/all_week.geojson");
    }

    #[test]
    fn failed_status_exposes_reason() {
        let status = FetchStatus::Failed {
            reason: "HTTP 503".to_string(),
        };
        assert_eq!(status.error(), Some("HTTP 503"));
        assert!(!status.is_loading());
        assert!(FetchStatus::Fetching.is_loading());
    }
}
