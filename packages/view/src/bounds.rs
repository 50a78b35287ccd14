//! Bounding box of a set of coordinates.

use geo::{BoundingRect, MultiPoint, Point};
use quake_map_quake_models::{BoundingBox, EarthquakeEvent};

/// Anything with a latitude/longitude position.
pub trait Located {
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;
}

impl Located for EarthquakeEvent {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// `(lat, lon)` pairs.
impl Located for (f64, f64) {
    fn lat(&self) -> f64 {
        self.0
    }

    fn lon(&self) -> f64 {
        self.1
    }
}

/// Computes the minimal box enclosing `points`.
///
/// Returns `None` for an empty input, meaning there is nothing to fit and
/// the caller should fall back to the world view. Latitude and longitude
/// are reduced independently, so the result does not depend on input
/// order. Sets straddling the anti-meridian are not special-cased.
#[must_use]
pub fn compute_bounds<'a, P, I>(points: I) -> Option<BoundingBox>
where
    P: Located + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let multi: MultiPoint<f64> = points
        .into_iter()
        .map(|p| Point::new(p.lon(), p.lat()))
        .collect();

    multi.bounding_rect().map(|rect| {
        BoundingBox::new(rect.min().y, rect.min().x, rect.max().y, rect.max().x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_bounds() {
        let points: Vec<(f64, f64)> = Vec::new();
        assert_eq!(compute_bounds(&points), None);
    }

    #[test]
    fn single_point_is_degenerate_box() {
        let points = vec![(12.5, -71.25)];
        assert_eq!(
            compute_bounds(&points),
            Some(BoundingBox::from_point(12.5, -71.25))
        );
    }

    #[test]
    fn reduces_lat_and_lon_independently() {
        let points = vec![(10.0, 20.0), (-5.0, 30.0)];
        assert_eq!(
            compute_bounds(&points),
            Some(BoundingBox {
                min_lat: -5.0,
                min_lon: 20.0,
                max_lat: 10.0,
                max_lon: 30.0,
            })
        );
    }

    #[test]
    fn result_is_order_independent() {
        let mut points = vec![(1.0, 2.0), (-3.0, 40.0), (60.0, -170.0), (5.0, 5.0)];
        let forward = compute_bounds(&points);
        points.reverse();
        assert_eq!(compute_bounds(&points), forward);
    }

    #[test]
    fn anti_meridian_sets_span_the_globe() {
        let points = vec![(51.0, 179.5), (52.0, -179.5)];
        let bounds = compute_bounds(&points).unwrap();
        assert!(bounds.longitude_span() > 180.0);
    }
}
