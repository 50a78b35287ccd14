//! Feed registry: loads feed definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/feed/feeds/` is baked into the binary at
//! compile time via [`include_str!`]. The base URL defaults to the USGS
//! summary feed and can be pointed at a mirror with
//! `QUAKE_MAP_FEED_BASE_URL`.

use quake_map_feed_models::FeedDefinition;
use quake_map_quake_models::FeedWindow;

/// Default feed base URL.
pub const DEFAULT_BASE_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "QUAKE_MAP_FEED_BASE_URL";

/// TOML configs embedded at compile time.
const FEED_TOMLS: &[(&str, &str)] = &[
    ("hour", include_str!("../feeds/hour.toml")),
    ("day", include_str!("../feeds/day.toml")),
    ("week", include_str!("../feeds/week.toml")),
    ("month", include_str!("../feeds/month.toml")),
];

/// Total number of configured feeds (used in tests).
#[cfg(test)]
const EXPECTED_FEED_COUNT: usize = 4;

/// Returns all configured feed definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_feeds() -> Vec<FeedDefinition> {
    FEED_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse feed '{name}': {e}"))
        })
        .collect()
}

/// Looks up the definition for a window.
#[must_use]
pub fn feed_for(window: FeedWindow) -> Option<FeedDefinition> {
    all_feeds().into_iter().find(|f| f.window == window)
}

/// Resolves the feed base URL from the environment, falling back to
/// [`DEFAULT_BASE_URL`].
#[must_use]
pub fn base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_feeds() {
        let feeds = all_feeds();
        assert_eq!(
            feeds.len(),
            EXPECTED_FEED_COUNT,
            "Expected {EXPECTED_FEED_COUNT} feeds, found {}. \
             Update EXPECTED_FEED_COUNT after adding/removing feeds.",
            feeds.len()
        );
    }

    #[test]
    fn every_window_has_exactly_one_feed() {
        let feeds = all_feeds();
        let mut seen = BTreeSet::new();
        for feed in &feeds {
            assert!(seen.insert(feed.window), "Duplicate feed window: {}", feed.window);
        }
        for window in FeedWindow::all() {
            assert!(seen.contains(window), "No feed for window {window}");
        }
    }

    #[test]
    fn feed_urls_are_distinct_geojson_files() {
        let urls: BTreeSet<String> = all_feeds()
            .iter()
            .map(|f| f.url(DEFAULT_BASE_URL))
            .collect();
        assert_eq!(urls.len(), EXPECTED_FEED_COUNT);
        assert!(urls.iter().all(|u| u.ends_with(".geojson")));
        assert_eq!(
            feed_for(FeedWindow::Day).unwrap().url(DEFAULT_BASE_URL),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson"
        );
    }
}
