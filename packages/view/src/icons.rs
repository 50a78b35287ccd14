//! Magnitude → marker visual resolution with an append-only cache.
//!
//! Magnitudes are quantized to 0.5-wide buckets (`round(magnitude * 2)`).
//! Each bucket resolves to a single shared [`MarkerVisual`], built from the
//! bucket's representative magnitude (`bucket / 2`), so every magnitude in
//! a bucket gets the identical visual regardless of which one was seen
//! first. Unknown magnitudes have their own cache slot.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use quake_map_quake_models::{MagnitudeClass, MarkerVisual};

/// Marker size for events without a magnitude.
pub const UNKNOWN_SIZE_PX: f64 = 18.0;

const MIN_SIZE_PX: f64 = 14.0;
const MAX_SIZE_PX: f64 = 42.0;

/// Quantizes a magnitude to 0.5 steps, rounding halves up. `None` for
/// unknown (or `NaN`) magnitudes.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn bucket_for(magnitude: Option<f64>) -> Option<i64> {
    magnitude
        .filter(|m| !m.is_nan())
        .map(|m| (m * 2.0 + 0.5).floor() as i64)
}

/// Marker diameter: `clamp(12 + 4 * magnitude, 14, 42)`.
#[must_use]
pub fn marker_size(magnitude: Option<f64>) -> f64 {
    match magnitude {
        Some(m) if !m.is_nan() => 4.0f64.mul_add(m, 12.0).clamp(MIN_SIZE_PX, MAX_SIZE_PX),
        _ => UNKNOWN_SIZE_PX,
    }
}

/// Builds the visual for a bucket.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_visual(bucket: Option<i64>) -> MarkerVisual {
    let representative = bucket.map(|b| b as f64 / 2.0);
    MarkerVisual {
        bucket_key: bucket.unwrap_or(0),
        size_px: marker_size(representative),
        color: MagnitudeClass::from_magnitude(representative).color(),
        label: representative.map_or_else(|| "?".to_string(), |m| format!("{m:.1}")),
    }
}

/// Shared cache of marker visuals, keyed by magnitude bucket.
///
/// Construct one per rendering context and pass it by reference. Entries
/// are never evicted; the number of buckets is bounded by the range of
/// real-world magnitudes. Concurrent resolvers of the same bucket build
/// equal values, so a race can at worst duplicate work.
#[derive(Debug, Default)]
pub struct IconCache {
    entries: RwLock<BTreeMap<Option<i64>, Arc<MarkerVisual>>>,
}

impl IconCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the visual for `magnitude`, building and caching it on the
    /// first request for its bucket.
    pub fn resolve(&self, magnitude: Option<f64>) -> Arc<MarkerVisual> {
        let bucket = bucket_for(magnitude);

        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&bucket)
        {
            return Arc::clone(hit);
        }

        log::debug!("Icon cache miss for bucket {bucket:?}");
        let visual = Arc::new(build_visual(bucket));
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(bucket).or_insert(visual))
    }

    /// Number of cached buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
