//! Memoized derivation of everything the map and summary panel render.
//!
//! The derived view is a pure function of the fetched events and the filter
//! criteria. [`ViewModel`] caches the last result keyed on the fetcher's
//! data generation and the threshold, so repeated renders with unchanged
//! inputs reuse the same [`DerivedView`].

use std::sync::Arc;

use quake_map_quake_models::{
    BoundingBox, EarthquakeEvent, FilterCriteria, MarkerVisual, SummaryStats,
};
use serde::Serialize;

use crate::ViewConfig;
use crate::bounds::compute_bounds;
use crate::cluster::{ClusterGrouper, ClusterItem};
use crate::filter::{EventCollection, apply_filter, compute_stats_with};
use crate::frame::{FrameTracker, ResetToken, ViewFrame};
use crate::icons::IconCache;

/// Filtered events with their statistics and extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedView {
    pub collection: EventCollection,
    pub stats: SummaryStats,
    pub bounds: Option<BoundingBox>,
}

impl DerivedView {
    /// Derives a view without caching.
    #[must_use]
    pub fn compute(
        events: &[EarthquakeEvent],
        criteria: FilterCriteria,
        config: &ViewConfig,
    ) -> Self {
        let collection = apply_filter(events, criteria);
        let stats = compute_stats_with(&collection, config.averaging);
        let bounds = compute_bounds(&collection);
        Self {
            collection,
            stats,
            bounds,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeriveKey {
    generation: u64,
    min_magnitude_bits: u64,
}

/// Owns the rendering context: config, icon cache, clustering, framing, and
/// the memoized derived view.
#[derive(Debug)]
pub struct ViewModel {
    config: ViewConfig,
    icons: IconCache,
    grouper: ClusterGrouper,
    frames: FrameTracker,
    cached: Option<(DeriveKey, Arc<DerivedView>)>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

impl ViewModel {
    #[must_use]
    pub fn new(config: ViewConfig) -> Self {
        Self {
            grouper: ClusterGrouper::from_config(&config),
            config,
            icons: IconCache::new(),
            frames: FrameTracker::new(),
            cached: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ViewConfig {
        &self.config
    }

    #[must_use]
    pub const fn icons(&self) -> &IconCache {
        &self.icons
    }

    /// Returns the derived view for `events` at data `generation`.
    ///
    /// Recomputes only when `generation` or the threshold differs from the
    /// previous call. Callers must bump `generation` whenever `events`
    /// changes.
    pub fn derive(
        &mut self,
        generation: u64,
        events: &[EarthquakeEvent],
        criteria: FilterCriteria,
    ) -> Arc<DerivedView> {
        let key = DeriveKey {
            generation,
            min_magnitude_bits: criteria.min_magnitude().to_bits(),
        };

        if let Some((cached_key, view)) = &self.cached
            && *cached_key == key
        {
            return Arc::clone(view);
        }

        let view = Arc::new(DerivedView::compute(events, criteria, &self.config));
        log::debug!(
            "Derived view for generation {generation} at M{}+: {} of {} events",
            criteria.min_magnitude(),
            view.stats.count,
            events.len()
        );
        self.cached = Some((key, Arc::clone(&view)));
        view
    }

    /// One visual per event in `view`, in collection order.
    #[must_use]
    pub fn marker_visuals(&self, view: &DerivedView) -> Vec<Arc<MarkerVisual>> {
        view.collection
            .iter()
            .map(|e| self.icons.resolve(e.magnitude))
            .collect()
    }

    /// Groups the events of `view` at `zoom`. Member indices refer to
    /// `view.collection`.
    #[must_use]
    pub fn clusters(&self, view: &DerivedView, zoom: u8) -> Vec<ClusterItem> {
        self.grouper.group(&view.collection, zoom)
    }

    /// Splits `item` one zoom level deeper.
    #[must_use]
    pub fn expand(&self, view: &DerivedView, item: &ClusterItem, zoom: u8) -> Vec<ClusterItem> {
        self.grouper.expand(&view.collection, item, zoom)
    }

    /// Returns the camera frame to apply, or `None` to leave the user's
    /// current view alone.
    pub fn frame(&mut self, view: &DerivedView, reset: ResetToken) -> Option<ViewFrame> {
        self.frames.update(view.bounds, reset, &self.config)
    }
}
