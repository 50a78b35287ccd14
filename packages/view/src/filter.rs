//! Magnitude filtering and summary statistics.

use quake_map_quake_models::{EarthquakeEvent, FilterCriteria, SummaryStats};

use crate::AveragingPolicy;

/// Events passing the active filter, in feed order.
pub type EventCollection = Vec<EarthquakeEvent>;

/// Keeps every event whose magnitude is unknown or at least the threshold.
///
/// Output order is input order.
#[must_use]
pub fn apply_filter(events: &[EarthquakeEvent], criteria: FilterCriteria) -> EventCollection {
    events
        .iter()
        .filter(|e| criteria.accepts(e))
        .cloned()
        .collect()
}

/// Computes statistics with the default [`AveragingPolicy::NullAsZero`].
#[must_use]
pub fn compute_stats(collection: &[EarthquakeEvent]) -> SummaryStats {
    compute_stats_with(collection, AveragingPolicy::NullAsZero)
}

/// Computes count, average magnitude, and the strongest event.
///
/// The strongest event is the first one holding the maximal magnitude;
/// events with unknown magnitude never qualify.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats_with(collection: &[EarthquakeEvent], policy: AveragingPolicy) -> SummaryStats {
    if collection.is_empty() {
        return SummaryStats::default();
    }

    let average_magnitude = match policy {
        AveragingPolicy::NullAsZero => {
            let sum: f64 = collection.iter().map(|e| e.magnitude.unwrap_or(0.0)).sum();
            sum / collection.len() as f64
        }
        AveragingPolicy::ExcludeUnknown => {
            let (sum, known) = collection
                .iter()
                .filter_map(|e| e.magnitude)
                .fold((0.0, 0_usize), |(sum, n), m| (sum + m, n + 1));
            if known == 0 { 0.0 } else { sum / known as f64 }
        }
    };

    let mut strongest: Option<&EarthquakeEvent> = None;
    for event in collection {
        let Some(m) = event.magnitude else {
            continue;
        };
        if strongest.and_then(|s| s.magnitude).is_none_or(|best| m > best) {
            strongest = Some(event);
        }
    }

    SummaryStats {
        count: collection.len(),
        average_magnitude,
        strongest: strongest.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, magnitude: Option<f64>) -> EarthquakeEvent {
        EarthquakeEvent {
            id: id.to_string(),
            lat: 0.0,
            lon: 0.0,
            depth: None,
            magnitude,
            place: None,
            occurred_at: None,
            reference_url: None,
            tsunami_flag: false,
            felt_reports: None,
            alert_level: None,
        }
    }

    fn ids(events: &[EarthquakeEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn keeps_unknown_magnitude_and_drops_below_threshold() {
        let events = vec![
            event("two", Some(2.0)),
            event("none", None),
            event("five", Some(5.0)),
        ];
        let filtered = apply_filter(&events, FilterCriteria::new(3.0).unwrap());
        assert_eq!(ids(&filtered), ["none", "five"]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let events = vec![event("a", Some(2.99)), event("b", Some(3.0))];
        let filtered = apply_filter(&events, FilterCriteria::new(3.0).unwrap());
        assert_eq!(ids(&filtered), ["b"]);
    }

    #[test]
    fn zero_threshold_keeps_everything_in_order() {
        let events = vec![
            event("c", Some(0.2)),
            event("a", None),
            event("b", Some(7.1)),
        ];
        let filtered = apply_filter(&events, FilterCriteria::default());
        assert_eq!(ids(&filtered), ["c", "a", "b"]);
    }

    #[test]
    fn empty_collection_has_zeroed_stats() {
        assert_eq!(
            compute_stats(&[]),
            SummaryStats {
                count: 0,
                average_magnitude: 0.0,
                strongest: None,
            }
        );
    }

    #[test]
    fn average_counts_unknown_as_zero_by_default() {
        let events = vec![event("a", Some(4.0)), event("b", None), event("c", Some(2.0))];
        let stats = compute_stats(&events);
        assert_eq!(stats.count, 3);
        assert!((stats.average_magnitude - 2.0).abs() < 1e-12);
    }

    #[test]
    fn exclude_unknown_policy_skips_nulls_in_denominator() {
        let events = vec![event("a", Some(4.0)), event("b", None), event("c", Some(2.0))];
        let stats = compute_stats_with(&events, AveragingPolicy::ExcludeUnknown);
        assert_eq!(stats.count, 3);
        assert!((stats.average_magnitude - 3.0).abs() < 1e-12);

        let unknown_only = compute_stats_with(&[event("x", None)], AveragingPolicy::ExcludeUnknown);
        assert!(unknown_only.average_magnitude.abs() < f64::EPSILON);
    }

    #[test]
    fn strongest_ties_resolve_to_first() {
        let events = vec![
            event("small", Some(1.0)),
            event("first_big", Some(6.2)),
            event("unknown", None),
            event("second_big", Some(6.2)),
        ];
        let stats = compute_stats(&events);
        assert_eq!(stats.strongest.unwrap().id, "first_big");
    }

    #[test]
    fn strongest_is_none_when_all_unknown() {
        let stats = compute_stats(&[event("a", None), event("b", None)]);
        assert_eq!(stats.count, 2);
        assert!(stats.strongest.is_none());
    }

    #[test]
    fn count_and_average_are_order_independent() {
        let forward = vec![event("a", Some(1.5)), event("b", None), event("c", Some(4.5))];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = compute_stats(&forward);
        let b = compute_stats(&reversed);
        assert_eq!(a.count, b.count);
        assert!((a.average_magnitude - b.average_magnitude).abs() < 1e-12);
    }
}
