//! Screen-space grid clustering of event markers.
//!
//! Events are projected to Web Mercator pixel coordinates at the current
//! zoom and bucketed into square cells `cluster_radius_px` wide. Each
//! occupied cell becomes one [`ClusterItem`]: a singleton for a lone event,
//! a [`Cluster`] otherwise. Grouping is a partition of the input, so every
//! event lands in exactly one item at every zoom level and zooming in can
//! only split groups, never lose members.

use std::collections::BTreeMap;

use quake_map_quake_models::{BoundingBox, EarthquakeEvent};
use serde::Serialize;

use crate::ViewConfig;
use crate::bounds::compute_bounds;

/// Web Mercator tile size in pixels.
const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Highest zoom level the projection is evaluated at.
pub const MAX_ZOOM: u8 = 22;

/// Several events rendered as one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Indices into the clustered collection, ascending.
    pub members: Vec<usize>,
    /// Mean latitude of the members.
    pub lat: f64,
    /// Mean longitude of the members.
    pub lon: f64,
    /// Extent of the members; zooming to it expands the cluster.
    pub bounds: BoundingBox,
    /// Largest known magnitude among the members.
    pub max_magnitude: Option<f64>,
}

impl Cluster {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One renderable marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClusterItem {
    /// A single event, by index into the clustered collection.
    Single { index: usize },
    /// Two or more events sharing a grid cell.
    Cluster(Cluster),
}

impl ClusterItem {
    /// Indices of the events represented by this item.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        match self {
            Self::Single { index } => std::slice::from_ref(index),
            Self::Cluster(cluster) => &cluster.members,
        }
    }
}

/// Groups events into clusters for a zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterGrouper {
    radius_px: f64,
    disable_at_zoom: Option<u8>,
}

impl Default for ClusterGrouper {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

impl ClusterGrouper {
    #[must_use]
    pub const fn new(radius_px: f64, disable_at_zoom: Option<u8>) -> Self {
        Self {
            radius_px,
            disable_at_zoom,
        }
    }

    #[must_use]
    pub const fn from_config(config: &ViewConfig) -> Self {
        Self::new(config.cluster_radius_px, config.disable_clustering_at_zoom)
    }

    /// Groups all of `events` at `zoom`.
    ///
    /// Items are ordered by their lowest member index, so the result is
    /// deterministic for a fixed input and zoom.
    #[must_use]
    pub fn group(&self, events: &[EarthquakeEvent], zoom: u8) -> Vec<ClusterItem> {
        self.group_indices(events, 0..events.len(), zoom)
    }

    /// Re-groups the members of `item` one zoom level deeper.
    ///
    /// The union of the returned items' members equals `item`'s members.
    #[must_use]
    pub fn expand(
        &self,
        events: &[EarthquakeEvent],
        item: &ClusterItem,
        zoom: u8,
    ) -> Vec<ClusterItem> {
        let next = zoom.saturating_add(1).min(MAX_ZOOM);
        self.group_indices(events, item.members().iter().copied(), next)
    }

    fn group_indices(
        &self,
        events: &[EarthquakeEvent],
        indices: impl IntoIterator<Item = usize>,
        zoom: u8,
    ) -> Vec<ClusterItem> {
        let zoom = zoom.min(MAX_ZOOM);

        if self.disable_at_zoom.is_some_and(|z| zoom >= z) {
            return indices
                .into_iter()
                .filter(|&index| index < events.len())
                .map(|index| ClusterItem::Single { index })
                .collect();
        }

        let mut cells: BTreeMap<(i64, i64), usize> = BTreeMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for index in indices {
            let Some(event) = events.get(index) else {
                continue;
            };
            let cell = self.cell_for(event, zoom);
            let slot = *cells.entry(cell).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(index);
        }

        log::debug!(
            "Grouped {} events into {} markers at zoom {zoom}",
            groups.iter().map(Vec::len).sum::<usize>(),
            groups.len()
        );

        groups
            .into_iter()
            .map(|mut members| {
                members.sort_unstable();
                if members.len() == 1 {
                    ClusterItem::Single { index: members[0] }
                } else {
                    ClusterItem::Cluster(build_cluster(events, members))
                }
            })
            .collect()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_for(&self, event: &EarthquakeEvent, zoom: u8) -> (i64, i64) {
        let (x, y) = project(event.lat, event.lon, zoom);
        (
            (x / self.radius_px).floor() as i64,
            (y / self.radius_px).floor() as i64,
        )
    }
}

/// Projects a coordinate to Web Mercator world pixels at `zoom`.
#[must_use]
pub fn project(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powi(i32::from(zoom));
    let x = (lon + 180.0) / 360.0 * scale;

    let lat_rad = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * scale;

    (x, y)
}

#[allow(clippy::cast_precision_loss)]
fn build_cluster(events: &[EarthquakeEvent], members: Vec<usize>) -> Cluster {
    let points: Vec<&EarthquakeEvent> = members.iter().map(|&i| &events[i]).collect();
    let n = points.len() as f64;

    let lat = points.iter().map(|e| e.lat).sum::<f64>() / n;
    let lon = points.iter().map(|e| e.lon).sum::<f64>() / n;
    let max_magnitude = points
        .iter()
        .filter_map(|e| e.magnitude)
        .reduce(f64::max);
    let bounds = compute_bounds(points.iter().copied())
        .unwrap_or_else(|| BoundingBox::from_point(lat, lon));

    Cluster {
        members,
        lat,
        lon,
        bounds,
        max_magnitude,
    }
}
