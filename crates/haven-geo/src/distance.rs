//! Great-circle distance

use haven_core::GeoPoint;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
///
/// Symmetric in its arguments and exactly `0.0` for identical points.
/// Non-finite inputs produce `NaN`; callers that accept untrusted coordinates
/// should validate them first (see [`GeoPoint::is_valid`]).
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlat = lat2 - lat1;
    let dlon = lon2.to_radians() - lon1.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // rounding can push `a` a hair above 1 for antipodal points; NaN passes through
    let root = a.sqrt();
    let root = if root > 1.0 { 1.0 } else { root };
    2.0 * EARTH_RADIUS_KM * root.asin()
}

pub fn distance_between(a: GeoPoint, b: GeoPoint) -> f64 {
    distance_km(a.lat, a.lon, b.lat, b.lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_distances() {
        // Tel Aviv to Jerusalem: ~54 km
        let dist = distance_km(32.0853, 34.7818, 31.7683, 35.2137);
        assert!((dist - 54.0).abs() < 2.0);

        // NYC to London: ~5,570 km
        let dist = distance_km(40.7128, -74.0060, 51.5074, -0.1278);
        assert!((dist - 5570.0).abs() < 50.0);
    }

    #[test]
    fn test_identical_points_are_zero() {
        assert_eq!(distance_km(32.0853, 34.7818, 32.0853, 34.7818), 0.0);
        assert_eq!(distance_km(-90.0, 180.0, -90.0, 180.0), 0.0);
    }

    #[test]
    fn test_antipodal_points() {
        let dist = distance_km(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((dist - half_circumference).abs() < 1e-3);
    }

    #[test]
    fn test_non_finite_input_is_nan() {
        assert!(distance_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_monotonic_along_meridian() {
        let mut previous = 0.0;
        for step in 1..=18 {
            let dist = distance_km(0.0, 0.0, step as f64 * 5.0, 0.0);
            assert!(dist > previous);
            previous = dist;
        }
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..=90.0,
            lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0,
            lon2 in -180.0f64..=180.0,
        ) {
            prop_assert_eq!(distance_km(lat1, lon1, lat2, lon2), distance_km(lat2, lon2, lat1, lon1));
        }

        #[test]
        fn prop_distance_to_self_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
        }
    }
}
