//! Geo utilities
//!
//! Great-circle distances, ambulance ETA estimates and nearest-first ordering
//! of anything that has a position.

use medibed_types::{Ambulance, GeoPoint, Hospital};
use std::cmp::Ordering;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average ambulance speed assumed for ETA estimates
pub const AMBULANCE_SPEED_KMH: f64 = 30.0;

/// Haversine distance in kilometres between two lat/lng pairs
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1]
    let a = a.clamp(0.0, 1.0);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// [`distance_km`] between two points
pub fn distance_between(from: GeoPoint, to: GeoPoint) -> f64 {
    distance_km(from.lat, from.lng, to.lat, to.lng)
}

/// Minutes to cover `distance_km` at [`AMBULANCE_SPEED_KMH`], rounded.
///
/// Unknown or non-positive distances give 0. Distances beyond u32::MAX
/// minutes (and infinity) saturate at u32::MAX.
pub fn estimate_eta_minutes(distance_km: f64) -> u32 {
    if distance_km.is_nan() || distance_km <= 0.0 {
        return 0;
    }
    (distance_km / AMBULANCE_SPEED_KMH * 60.0).round() as u32
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Anything with a fixed position
pub trait Located {
    fn position(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn position(&self) -> GeoPoint {
        *self
    }
}

impl Located for Hospital {
    fn position(&self) -> GeoPoint {
        self.location()
    }
}

impl Located for Ambulance {
    fn position(&self) -> GeoPoint {
        self.location()
    }
}

impl<T: Located> Located for &T {
    fn position(&self) -> GeoPoint {
        (*self).position()
    }
}

/// Order nearest-first from `origin`. Stable; without an origin the input
/// order is kept.
pub fn sort_by_distance<T: Located>(items: &mut [T], origin: Option<GeoPoint>) {
    let Some(origin) = origin else {
        return;
    };
    items.sort_by(|a, b| {
        let da = distance_between(origin, a.position());
        let db = distance_between(origin, b.position());
        da.partial_cmp(&db).unwrap_or(Ordering::Equal)
    });
}

/// Items no further than `radius_km` from `origin`, paired with their
/// distance and ordered nearest-first
pub fn within_radius<T: Located>(items: &[T], origin: GeoPoint, radius_km: f64) -> Vec<(&T, f64)> {
    let mut hits: Vec<(&T, f64)> = items
        .iter()
        .map(|item| (item, distance_between(origin, item.position())))
        .filter(|(_, d)| *d <= radius_km)
        .collect();
    hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    const HYDERABAD: GeoPoint = GeoPoint::new(17.385, 78.4867);

    #[test]
    fn test_distance_zero_for_identical_points() {
        assert_eq!(distance_km(17.385, 78.4867, 17.385, 78.4867), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_distance_hyderabad_to_bangalore() {
        let d = distance_between(HYDERABAD, GeoPoint::new(12.9716, 77.5946));
        assert!((d - 500.0).abs() < 5.0, "got {}", d);
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(-1.0, 0)]
    #[case(f64::NAN, 0)]
    #[case(1.0, 2)]
    #[case(2.5, 5)]
    #[case(4.0, 8)]
    #[case(0.24, 0)]
    #[case(300.0, 600)]
    #[case(1.0e12, u32::MAX)]
    #[case(f64::INFINITY, u32::MAX)]
    fn test_eta(#[case] distance: f64, #[case] minutes: u32) {
        assert_eq!(estimate_eta_minutes(distance), minutes);
    }

    #[test]
    fn test_round_to_two_decimals() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(2.005, 1), 2.0);
    }

    #[test]
    fn test_sort_by_distance_nearest_first() {
        let far = GeoPoint::new(17.5, 78.6);
        let near = GeoPoint::new(17.39, 78.49);
        let mid = GeoPoint::new(17.42, 78.52);
        let mut points = vec![far, near, mid];
        sort_by_distance(&mut points, Some(HYDERABAD));
        assert_eq!(points, vec![near, mid, far]);
    }

    #[test]
    fn test_sort_without_origin_keeps_order() {
        let a = GeoPoint::new(17.5, 78.6);
        let b = GeoPoint::new(17.39, 78.49);
        let mut points = vec![a, b];
        sort_by_distance(&mut points, None);
        assert_eq!(points, vec![a, b]);
    }

    #[test]
    fn test_within_radius() {
        let points = vec![
            GeoPoint::new(17.40, 78.49),
            GeoPoint::new(17.70, 78.49),
            GeoPoint::new(17.39, 78.48),
        ];
        let hits = within_radius(&points, HYDERABAD, 4.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(*hits[0].0, points[2]);
        assert!(hits.iter().all(|(_, d)| *d <= 4.0));
    }

    proptest! {
        #[test]
        fn prop_distance_symmetric_and_non_negative(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let there = distance_km(lat1, lon1, lat2, lon2);
            let back = distance_km(lat2, lon2, lat1, lon1);
            prop_assert!(there >= 0.0);
            prop_assert!((there - back).abs() < 1e-6);
            prop_assert!(there <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
