//! Plain-text rendering of fetch status, summaries, markers, and clusters.

use quake_map_feed_models::FetchStatus;
use quake_map_quake_models::{EarthquakeEvent, FeedWindow, MagnitudeClass, MarkerVisual};
use quake_map_view::cluster::ClusterItem;
use quake_map_view::frame::ViewFrame;
use quake_map_view::model::DerivedView;

pub const LOADING_MESSAGE: &str = "Loading recent earthquakes…";
pub const EMPTY_MESSAGE: &str = "No earthquakes match the current filters.";

/// Banner for the fetch lifecycle, if there is anything to say.
#[must_use]
pub fn status_line(status: &FetchStatus) -> Option<String> {
    match status {
        FetchStatus::Idle => None,
        FetchStatus::Fetching => Some(LOADING_MESSAGE.to_string()),
        FetchStatus::Success { updated_at } => Some(format!(
            "Last updated: {}",
            updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        FetchStatus::Failed { reason } => Some(format!(
            "Failed to load data: {reason}. Please check your network and try again."
        )),
    }
}

/// Stats bar plus the strongest event, or the empty-result notice.
#[must_use]
pub fn summary_lines(window: FeedWindow, min_magnitude: f64, view: &DerivedView) -> Vec<String> {
    if view.is_empty() {
        return vec![EMPTY_MESSAGE.to_string()];
    }

    let stats = &view.stats;
    let mut lines = vec![
        format!("{} · M{min_magnitude}+", window.label()),
        format!("Events: {}", stats.count),
        format!("Average magnitude: {:.2}", stats.average_magnitude),
    ];
    match &stats.strongest {
        Some(event) => lines.push(format!("Strongest: {}", event.headline())),
        None => lines.push("Strongest: —".to_string()),
    }
    if let Some(bounds) = view.bounds {
        lines.push(format!(
            "Bounds: lat {:.3}..{:.3}, lon {:.3}..{:.3}",
            bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
        ));
    }
    lines
}

/// One line per event with its marker label and color.
#[must_use]
pub fn event_line(event: &EarthquakeEvent, visual: &MarkerVisual) -> String {
    let occurred = event
        .occurred_at
        .map_or_else(|| "—".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    let mut line = format!(
        "[{:>3} {:<6}] {}  depth {}  at {occurred}",
        visual.label,
        visual.color,
        event.headline(),
        event.depth_label(),
    );
    if event.tsunami_flag {
        line.push_str("  TSUNAMI");
    }
    if let Some(felt) = event.felt_reports {
        line.push_str(&format!("  felt {felt}"));
    }
    line
}

/// Describes one marker on the map.
#[must_use]
pub fn cluster_line(item: &ClusterItem, collection: &[EarthquakeEvent]) -> String {
    match item {
        ClusterItem::Single { index } => collection
            .get(*index)
            .map_or_else(|| format!("event #{index}"), EarthquakeEvent::headline),
        ClusterItem::Cluster(cluster) => {
            let strongest = cluster
                .max_magnitude
                .map_or_else(|| "—".to_string(), |m| format!("M{m:.1}"));
            format!(
                "cluster of {} around ({:.3}, {:.3}), strongest {strongest}",
                cluster.len(),
                cluster.lat,
                cluster.lon
            )
        }
    }
}

#[must_use]
pub fn frame_line(frame: &ViewFrame) -> String {
    match frame {
        ViewFrame::Fit {
            bounds,
            padding_px,
            max_zoom,
        } => {
            let [[south, west], [north, east]] = bounds.corners();
            format!(
                "Fit to [{south:.3}, {west:.3}] .. [{north:.3}, {east:.3}] \
                 (padding {padding_px}px, max zoom {max_zoom})"
            )
        }
        ViewFrame::World { center, zoom } => {
            format!("World view at [{}, {}] zoom {zoom}", center[0], center[1])
        }
    }
}

#[must_use]
pub fn legend_lines() -> Vec<String> {
    MagnitudeClass::legend()
        .iter()
        .map(|class| {
            format!(
                "{:<8} {:<7} {}",
                class.legend_label(),
                class.color().hex(),
                class.color()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use quake_map_quake_models::{FilterCriteria, SummaryStats};

    use super::*;

    fn event(id: &str, magnitude: Option<f64>) -> EarthquakeEvent {
        EarthquakeEvent {
            id: id.to_string(),
            lat: 35.7,
            lon: -117.5,
            depth: Some(8.5),
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
    fn failure_status_shows_reason() {
        let status = FetchStatus::Failed {
            reason: "HTTP 503".to_string(),
        };
        let line = status_line(&status).unwrap();
        assert!(line.starts_with("Failed to load data: HTTP 503"));
    }

    #[test]
    fn success_status_shows_timestamp() {
        let status = FetchStatus::Success {
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        };
        assert_eq!(
            status_line(&status).as_deref(),
            Some("Last updated: 2024-03-01 12:30:00 UTC")
        );
        assert_eq!(status_line(&FetchStatus::Idle), None);
        assert_eq!(
            status_line(&FetchStatus::Fetching).as_deref(),
            Some(LOADING_MESSAGE)
        );
    }

    #[test]
    fn empty_view_renders_empty_notice() {
        let view = DerivedView {
            collection: Vec::new(),
            stats: SummaryStats::default(),
            bounds: None,
        };
        assert_eq!(
            summary_lines(FeedWindow::Day, 0.0, &view),
            [EMPTY_MESSAGE.to_string()]
        );
    }

    #[test]
    fn summary_names_the_strongest_event() {
        let events = vec![event("a", Some(2.0)), event("b", Some(4.3))];
        let view = DerivedView::compute(
            &events,
            FilterCriteria::default(),
            &quake_map_view::ViewConfig::default(),
        );
        let lines = summary_lines(FeedWindow::Week, 0.0, &view);
        assert_eq!(lines[0], "Past 7 days · M0+");
        assert_eq!(lines[1], "Events: 2");
        assert_eq!(lines[2], "Average magnitude: 3.15");
        assert_eq!(lines[3], "Strongest: M4.3 – 10 km SW of Ridgecrest, CA");
    }

    #[test]
    fn legend_lists_every_class() {
        let lines = legend_lines();
        assert_eq!(lines.len(), MagnitudeClass::legend().len());
        assert!(lines.iter().any(|l| l.contains("#9CA3AF")));
    }

    #[test]
    fn world_frame_renders_center() {
        let frame = ViewFrame::World {
            center: [20.0, 0.0],
            zoom: 2,
        };
        assert_eq!(frame_line(&frame), "World view at [20, 0] zoom 2");
    }
}
