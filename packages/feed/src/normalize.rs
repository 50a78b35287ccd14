//! Normalizes raw `GeoJSON` features into [`EarthquakeEvent`] values.
//!
//! Malformed records are dropped silently: a feature without usable
//! coordinates, or with a magnitude that is present but not a number, never
//! reaches the view and never fails the fetch.

use chrono::DateTime;
use quake_map_feed_models::{RawFeedRecord, RawMagnitude};
use quake_map_quake_models::EarthquakeEvent;
use serde_json::Value;

use crate::FeedError;

/// Parses a feed body into raw records.
///
/// A document without a `features` array yields no records rather than an
/// error.
///
/// # Errors
///
/// Returns [`FeedError::Json`] if `body` is not valid JSON.
pub fn parse_feed(body: &str) -> Result<Vec<RawFeedRecord>, FeedError> {
    let json: Value = serde_json::from_str(body)?;

    let Some(features) = json.get("features").and_then(Value::as_array) else {
        log::debug!("Feed document has no features array");
        return Ok(Vec::new());
    };

    Ok(features.iter().map(raw_record_from_feature).collect())
}

/// Extracts the consumed fields from a single feature.
///
/// Never fails: anything missing or of the wrong type becomes `None` (or
/// [`RawMagnitude::Invalid`] for a non-numeric magnitude) and is judged
/// later by [`normalize_record`].
#[must_use]
pub fn raw_record_from_feature(feature: &Value) -> RawFeedRecord {
    let coordinates = feature
        .pointer("/geometry/coordinates")
        .and_then(Value::as_array);
    let coordinate = |i: usize| {
        coordinates
            .and_then(|c| c.get(i))
            .and_then(Value::as_f64)
    };

    let props = feature.get("properties");
    let prop = |key: &str| props.and_then(|p| p.get(key));
    let prop_str = |key: &str| prop(key).and_then(Value::as_str).map(str::to_string);

    let id = feature.get("id").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    RawFeedRecord {
        id,
        longitude: coordinate(0),
        latitude: coordinate(1),
        depth: coordinate(2),
        magnitude: RawMagnitude::from_json(prop("mag")),
        place: prop_str("place"),
        time_ms: prop("time").and_then(Value::as_i64),
        url: prop_str("url"),
        tsunami: prop("tsunami").and_then(Value::as_i64),
        felt: prop("felt").and_then(Value::as_i64),
        alert: prop_str("alert"),
    }
}

/// Normalizes raw records, preserving input order among survivors.
#[must_use]
pub fn normalize(records: &[RawFeedRecord]) -> Vec<EarthquakeEvent> {
    let events: Vec<EarthquakeEvent> = records.iter().filter_map(normalize_record).collect();

    let dropped = records.len() - events.len();
    if dropped > 0 {
        log::debug!(
            "Dropped {dropped} of {} feed records with invalid coordinates or magnitude",
            records.len()
        );
    }

    events
}

/// Validates a single record.
///
/// Returns `None` when latitude or longitude is missing, non-finite, or out
/// of range, or when the magnitude is present but not a number.
#[must_use]
pub fn normalize_record(raw: &RawFeedRecord) -> Option<EarthquakeEvent> {
    let lat = raw
        .latitude
        .filter(|v| v.is_finite() && (-90.0..=90.0).contains(v))?;
    let lon = raw
        .longitude
        .filter(|v| v.is_finite() && (-180.0..=180.0).contains(v))?;

    let magnitude = match raw.magnitude {
        RawMagnitude::Missing => None,
        RawMagnitude::Number(m) if !m.is_nan() => Some(m),
        RawMagnitude::Number(_) | RawMagnitude::Invalid => return None,
    };

    Some(EarthquakeEvent {
        id: raw.id.clone().unwrap_or_default(),
        lat,
        lon,
        depth: raw.depth.filter(|d| d.is_finite()),
        magnitude,
        place: raw.place.clone(),
        occurred_at: raw.time_ms.and_then(DateTime::from_timestamp_millis),
        reference_url: raw.url.clone(),
        tsunami_flag: raw.tsunami == Some(1),
        felt_reports: raw.felt,
        alert_level: raw.alert.clone(),
    })
}
