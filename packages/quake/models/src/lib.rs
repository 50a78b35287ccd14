#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake event, filter, statistics, and marker visual types.
//!
//! This crate defines the normalized domain types shared across the
//! quake-map system. Raw feed records are normalized into
//! [`EarthquakeEvent`] values, which are then filtered, aggregated, framed,
//! and styled by the view layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The retrospective time span covered by a single feed URL.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeedWindow {
    /// Events from the past hour
    Hour,
    /// Events from the past day
    #[default]
    Day,
    /// Events from the past seven days
    Week,
    /// Events from the past thirty days
    Month,
}

impl FeedWindow {
    /// Returns all variants of this enum, shortest window first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Hour, Self::Day, Self::Week, Self::Month]
    }

    /// Human-readable label (e.g. "Past day").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hour => "Past hour",
            Self::Day => "Past day",
            Self::Week => "Past 7 days",
            Self::Month => "Past 30 days",
        }
    }
}

/// Visual color token for a marker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorToken {
    /// Minor events.
    Green,
    /// Light events.
    Yellow,
    /// Moderate events.
    Orange,
    /// Strong events.
    Red,
    /// Events without a magnitude.
    Gray,
}

impl ColorToken {
    /// CSS hex color used by the rendering surface.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Green => "#22c55e",
            Self::Yellow => "#eab308",
            Self::Orange => "#f97316",
            Self::Red => "#ef4444",
            Self::Gray => "#9CA3AF",
        }
    }
}

/// Magnitude classes used for marker coloring and the legend.
///
/// Lower bounds are inclusive: a magnitude of exactly 4.5 is
/// [`MagnitudeClass::Moderate`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MagnitudeClass {
    /// Below 2.5
    Minor,
    /// 2.5 up to 4.5
    Light,
    /// 4.5 up to 6.0
    Moderate,
    /// 6.0 and above
    Strong,
    /// Magnitude missing or not a number
    Unknown,
}

impl MagnitudeClass {
    /// Classifies a magnitude. `None` and `NaN` are [`Self::Unknown`].
    #[must_use]
    pub fn from_magnitude(magnitude: Option<f64>) -> Self {
        match magnitude {
            None => Self::Unknown,
            Some(m) if m.is_nan() => Self::Unknown,
            Some(m) if m < 2.5 => Self::Minor,
            Some(m) if m < 4.5 => Self::Light,
            Some(m) if m < 6.0 => Self::Moderate,
            Some(_) => Self::Strong,
        }
    }

    #[must_use]
    pub const fn color(self) -> ColorToken {
        match self {
            Self::Minor => ColorToken::Green,
            Self::Light => ColorToken::Yellow,
            Self::Moderate => ColorToken::Orange,
            Self::Strong => ColorToken::Red,
            Self::Unknown => ColorToken::Gray,
        }
    }

    /// Inclusive lower magnitude bound, or `None` for [`Self::Unknown`].
    #[must_use]
    pub const fn lower_bound(self) -> Option<f64> {
        match self {
            Self::Minor => Some(f64::NEG_INFINITY),
            Self::Light => Some(2.5),
            Self::Moderate => Some(4.5),
            Self::Strong => Some(6.0),
            Self::Unknown => None,
        }
    }

    /// Legend text shown next to the color swatch.
    #[must_use]
    pub const fn legend_label(self) -> &'static str {
        match self {
            Self::Minor => "< 2.5 (minor)",
            Self::Light => "2.5 - 4.5 (light)",
            Self::Moderate => "4.5 - 6.0 (moderate)",
            Self::Strong => ">= 6.0 (strong)",
            Self::Unknown => "unknown",
        }
    }

    /// The legend entries in display order.
    #[must_use]
    pub const fn legend() -> &'static [Self] {
        &[
            Self::Minor,
            Self::Light,
            Self::Moderate,
            Self::Strong,
            Self::Unknown,
        ]
    }
}

/// A seismic event normalized from the feed.
///
/// `lat` and `lon` are always finite and within their valid ranges;
/// `magnitude`, when present, is never `NaN`. Records that cannot satisfy
/// this are dropped during normalization rather than partially admitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeEvent {
    /// Feed-assigned unique identifier (e.g. `"us7000abcd"`).
    pub id: String,
    /// Latitude (WGS84), in `[-90, 90]`.
    pub lat: f64,
    /// Longitude (WGS84), in `[-180, 180]`.
    pub lon: f64,
    /// Hypocenter depth in kilometers.
    pub depth: Option<f64>,
    /// Event magnitude. `None` when the feed has not assigned one yet.
    pub magnitude: Option<f64>,
    /// Place description (e.g. "10 km SW of Ridgecrest, CA").
    pub place: Option<String>,
    /// When the event occurred.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Link to the event detail page.
    pub reference_url: Option<String>,
    /// Whether the feed flagged a tsunami.
    pub tsunami_flag: bool,
    /// Number of "did you feel it" reports.
    pub felt_reports: Option<i64>,
    /// PAGER alert level (e.g. "green", "yellow").
    pub alert_level: Option<String>,
}

impl EarthquakeEvent {
    /// Magnitude class used for coloring.
    #[must_use]
    pub fn class(&self) -> MagnitudeClass {
        MagnitudeClass::from_magnitude(self.magnitude)
    }

    /// One-line summary, e.g. `"M4.2 – 10 km SW of Ridgecrest, CA"`.
    #[must_use]
    pub fn headline(&self) -> String {
        let magnitude = self
            .magnitude
            .map_or_else(|| "—".to_string(), |m| format!("{m:.1}"));
        let place = self.place.as_deref().unwrap_or("Unknown location");
        format!("M{magnitude} – {place}")
    }

    /// Depth rendered for display, e.g. `"10.5 km"`.
    #[must_use]
    pub fn depth_label(&self) -> String {
        self.depth
            .map_or_else(|| "—".to_string(), |d| format!("{d} km"))
    }
}

/// Error returned when a minimum magnitude threshold is negative or `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidThresholdError {
    /// The rejected threshold.
    pub value: f64,
}

impl std::fmt::Display for InvalidThresholdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid minimum magnitude {}: expected a number >= 0",
            self.value
        )
    }
}

impl std::error::Error for InvalidThresholdError {}

/// The active magnitude filter.
///
/// A pure value: the filtered view is recomputed from the full event set
/// whenever the threshold changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFilterCriteria")]
pub struct FilterCriteria {
    min_magnitude: f64,
}

/// Unvalidated wire form of [`FilterCriteria`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilterCriteria {
    min_magnitude: f64,
}

impl TryFrom<RawFilterCriteria> for FilterCriteria {
    type Error = InvalidThresholdError;

    fn try_from(raw: RawFilterCriteria) -> Result<Self, Self::Error> {
        Self::new(raw.min_magnitude)
    }
}

impl FilterCriteria {
    /// Creates filter criteria for the given threshold.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidThresholdError`] if `min_magnitude` is negative or
    /// `NaN`.
    pub fn new(min_magnitude: f64) -> Result<Self, InvalidThresholdError> {
        if min_magnitude.is_nan() || min_magnitude < 0.0 {
            return Err(InvalidThresholdError {
                value: min_magnitude,
            });
        }
        Ok(Self { min_magnitude })
    }

    #[must_use]
    pub const fn min_magnitude(&self) -> f64 {
        self.min_magnitude
    }

    /// Whether an event passes this filter.
    ///
    /// Events without a magnitude always pass: an unknown magnitude is not
    /// treated as a low one.
    #[must_use]
    pub fn accepts(&self, event: &EarthquakeEvent) -> bool {
        event.magnitude.is_none_or(|m| m >= self.min_magnitude)
    }
}

/// Summary statistics over a filtered event collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Number of events in the collection.
    pub count: usize,
    /// Mean magnitude (see `AveragingPolicy` in the view crate for how
    /// unknown magnitudes are treated).
    pub average_magnitude: f64,
    /// The event with the largest magnitude; ties go to the earliest.
    pub strongest: Option<EarthquakeEvent>,
}

/// Minimal axis-aligned latitude/longitude rectangle.
///
/// No anti-meridian handling: a set straddling longitude ±180 yields a box
/// spanning nearly the whole globe. Use [`Self::longitude_span`] to detect
/// that case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub min_lat: f64,
    /// Western longitude boundary.
    pub min_lon: f64,
    /// Northern latitude boundary.
    pub max_lat: f64,
    /// Eastern longitude boundary.
    pub max_lon: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// A degenerate box whose corners are both `(lat, lon)`.
    #[must_use]
    pub const fn from_point(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, lat, lon)
    }

    #[must_use]
    pub fn longitude_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    #[must_use]
    pub fn latitude_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Center as `(lat, lon)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.min_lat, self.max_lat),
            f64::midpoint(self.min_lon, self.max_lon),
        )
    }

    /// Whether `(lat, lon)` lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Corners as `[[min_lat, min_lon], [max_lat, max_lon]]`, the shape map
    /// widgets expect for fit-to-bounds calls.
    #[must_use]
    pub const fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lat, self.min_lon], [self.max_lat, self.max_lon]]
    }
}

/// Cached visual descriptor for a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerVisual {
    /// Magnitude quantized to 0.5 steps (`round(magnitude * 2)`), `0` for
    /// unknown magnitudes.
    pub bucket_key: i64,
    /// Marker diameter in pixels.
    pub size_px: f64,
    /// Fill color, from the bucket's magnitude class.
    pub color: ColorToken,
    /// Text drawn inside the marker (e.g. `"4.5"`, or `"?"` when unknown).
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(magnitude: Option<f64>) -> EarthquakeEvent {
        EarthquakeEvent {
            id: "ci1".to_string(),
            lat: 35.7,
            lon: -117.5,
            depth: Some(8.2),
            magnitude,
            place: Some("10 km SW of Ridgecrest, CA".to_string()),
            occurred_at: None,
            reference_url: None,
            tsunami_flag: false,
            felt_reports: None,
            alert_level: None,
        }
    }

    #[test]
    fn classifies_magnitudes_with_inclusive_lower_bounds() {
        assert_eq!(MagnitudeClass::from_magnitude(Some(2.49)), MagnitudeClass::Minor);
        assert_eq!(MagnitudeClass::from_magnitude(Some(2.5)), MagnitudeClass::Light);
        assert_eq!(MagnitudeClass::from_magnitude(Some(4.5)), MagnitudeClass::Moderate);
        assert_eq!(MagnitudeClass::from_magnitude(Some(6.0)), MagnitudeClass::Strong);
        assert_eq!(MagnitudeClass::from_magnitude(Some(-0.4)), MagnitudeClass::Minor);
    }

    #[test]
    fn unknown_magnitude_is_gray() {
        assert_eq!(MagnitudeClass::from_magnitude(None).color(), ColorToken::Gray);
        assert_eq!(
            MagnitudeClass::from_magnitude(Some(f64::NAN)).color(),
            ColorToken::Gray
        );
    }

    #[test]
    fn rejects_negative_or_nan_threshold() {
        assert!(FilterCriteria::new(-0.1).is_err());
        assert!(FilterCriteria::new(f64::NAN).is_err());
        assert!(FilterCriteria::new(0.0).is_ok());
    }

    #[test]
    fn deserializing_criteria_enforces_threshold_range() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"minMagnitude": 2.5}"#).unwrap();
        assert!((criteria.min_magnitude() - 2.5).abs() < f64::EPSILON);

        let negative = serde_json::from_str::<FilterCriteria>(r#"{"minMagnitude": -1.0}"#);
        assert!(negative.unwrap_err().to_string().contains("invalid minimum magnitude"));
    }

    #[test]
    fn criteria_round_trips_through_json() {
        let criteria = FilterCriteria::new(4.0).unwrap();
        let json = serde_json::to_string(&criteria).unwrap();
        assert_eq!(json, r#"{"minMagnitude":4.0}"#);
        assert_eq!(serde_json::from_str::<FilterCriteria>(&json).unwrap(), criteria);
    }

    #[test]
    fn criteria_always_accepts_unknown_magnitude() {
        let criteria = FilterCriteria::new(9.0).unwrap();
        assert!(criteria.accepts(&event(None)));
        assert!(!criteria.accepts(&event(Some(8.9))));
        assert!(criteria.accepts(&event(Some(9.0))));
    }

    #[test]
    fn headline_falls_back_for_missing_fields() {
        let mut e = event(None);
        e.place = None;
        assert_eq!(e.headline(), "M— – Unknown location");
        assert_eq!(event(Some(4.3)).headline(), "M4.3 – 10 km SW of Ridgecrest, CA");
        assert_eq!(event(None).depth_label(), "8.2 km");
    }

    #[test]
    fn feed_window_round_trips_through_strum() {
        for window in FeedWindow::all() {
            let parsed: FeedWindow = window.to_string().parse().unwrap();
            assert_eq!(parsed, *window);
        }
        assert_eq!(FeedWindow::default(), FeedWindow::Day);
        assert_eq!(FeedWindow::Week.as_ref(), "week");
    }

    #[test]
    fn bounding_box_serializes_camel_case() {
        let json = serde_json::to_value(BoundingBox::new(-5.0, 20.0, 10.0, 30.0)).unwrap();
        assert_eq!(json["minLat"], -5.0);
        assert_eq!(json["maxLon"], 30.0);
    }
}
