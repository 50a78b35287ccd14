//! View configuration, deserialized from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! [`ViewConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ViewConfigError;

/// How unknown magnitudes contribute to the average.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AveragingPolicy {
    /// Unknown magnitudes count as 0 and stay in the denominator.
    #[default]
    NullAsZero,
    /// Unknown magnitudes are left out of both sum and denominator.
    ExcludeUnknown,
}

/// Tunables for clustering, framing, and statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Grid cell size, in screen pixels, used to group markers.
    pub cluster_radius_px: f64,
    /// At or above this zoom every event is rendered as a singleton.
    pub disable_clustering_at_zoom: Option<u8>,
    /// Padding applied when fitting the map to the event bounds.
    pub fit_padding_px: u32,
    /// Upper zoom limit when fitting to bounds, so a single event does not
    /// zoom to street level.
    pub fit_max_zoom: u8,
    /// `[lat, lon]` shown when there is nothing to fit.
    pub world_center: [f64; 2],
    /// Zoom shown when there is nothing to fit.
    pub world_zoom: u8,
    /// How unknown magnitudes enter the average.
    pub averaging: AveragingPolicy,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            cluster_radius_px: 80.0,
            disable_clustering_at_zoom: None,
            fit_padding_px: 20,
            fit_max_zoom: 6,
            world_center: [20.0, 0.0],
            world_zoom: 2,
            averaging: AveragingPolicy::NullAsZero,
        }
    }
}

impl ViewConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ViewConfigError`] if the TOML is malformed or a value is
    /// out of range.
    pub fn from_toml_str(s: &str) -> Result<Self, ViewConfigError> {
        let config: Self = toml::de::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ViewConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ViewConfigError> {
        log::debug!("Loading view config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ViewConfigError> {
        if !(self.cluster_radius_px.is_finite() && self.cluster_radius_px > 0.0) {
            return Err(ViewConfigError::Invalid {
                message: format!(
                    "cluster_radius_px must be a positive number, got {}",
                    self.cluster_radius_px
                ),
            });
        }
        let [lat, lon] = self.world_center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ViewConfigError::Invalid {
                message: format!("world_center [{lat}, {lon}] is not a valid coordinate"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        assert_eq!(ViewConfig::from_toml_str("").unwrap(), ViewConfig::default());
    }

    #[test]
    fn parses_partial_overrides() {
        let config = ViewConfig::from_toml_str(
            "cluster_radius_px = 40.0\ndisable_clustering_at_zoom = 9\naveraging = \"exclude_unknown\"\n",
        )
        .unwrap();
        assert!((config.cluster_radius_px - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.disable_clustering_at_zoom, Some(9));
        assert_eq!(config.averaging, AveragingPolicy::ExcludeUnknown);
        assert_eq!(config.fit_max_zoom, 6);
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(matches!(
            ViewConfig::from_toml_str("cluster_radius_px = 0.0"),
            Err(ViewConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_invalid_world_center() {
        assert!(ViewConfig::from_toml_str("world_center = [95.0, 0.0]").is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            ViewConfig::from_toml_str("cluster_radius_px = "),
            Err(ViewConfigError::Toml(_))
        ));
    }
}
