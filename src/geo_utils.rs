//! # Geographic Utilities
//!
//! Distance and extent computations over recorded GPS fixes.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two fixes |
//! | [`polyline_length`] | Total length of a recorded track in meters |
//! | [`compute_bounds`] | Bounding box of a track, for map framing |
//!
//! ## Example
//!
//! ```rust
//! use workout_tracking::{GpsPoint, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(60.00, 24.00, 0),
//!     GpsPoint::new(60.00, 24.01, 1_000),
//!     GpsPoint::new(60.00, 24.02, 2_000),
//! ];
//!
//! let length = geo_utils::polyline_length(&track);
//! assert!((length - 1112.0).abs() < 5.0);
//! ```
//!
//! ## Algorithm Notes
//!
//! Distances use the haversine formula on a spherical Earth of radius
//! 6,371,000 m. `geo`'s haversine assumes its own mean radius, and its result
//! is linear in the radius, so it is rescaled. At running scale this agrees
//! with ellipsoidal distance to well under 0.5%, far below GPS noise.
//!
//! All functions expect WGS84 coordinates in degrees.

use geo::{Distance, Haversine, Point};

use crate::{Bounds, GpsPoint};

/// Sphere radius used for every distance in the crate.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Radius `geo::Haversine` computes with.
const GEO_MEAN_EARTH_RADIUS_METERS: f64 = 6_371_008.8;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two fixes in meters.
///
/// ```rust
/// use workout_tracking::{GpsPoint, geo_utils};
///
/// let a = GpsPoint::new(60.00, 24.00, 0);
/// let b = GpsPoint::new(60.00, 24.01, 1_000);
///
/// let d = geo_utils::haversine_distance(&a, &b);
/// assert!((d - 556.0).abs() < 2.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2) * (EARTH_RADIUS_METERS / GEO_MEAN_EARTH_RADIUS_METERS)
}

/// Total length of a track, summed pairwise in recording order.
///
/// Empty and single-point tracks have zero length.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Bounding box enclosing every point of a track, or `None` for an empty track.
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(Bounds { min_lat, max_lat, min_lng, max_lng })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(60.1699, 24.9384, 0);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_longitude_step_at_60n() {
        // 0.01 degrees of longitude at 60N is half of what it is at the equator
        let a = GpsPoint::new(60.00, 24.00, 0);
        let b = GpsPoint::new(60.00, 24.01, 0);
        assert!(approx_eq(haversine_distance(&a, &b), 556.0, 2.0));
    }

    #[test]
    fn test_haversine_distance_uses_6371_km_sphere() {
        // One degree along a meridian is R * pi / 180
        let a = GpsPoint::new(10.0, 24.0, 0);
        let b = GpsPoint::new(11.0, 24.0, 0);
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!(approx_eq(haversine_distance(&a, &b), expected, 1e-6));
        assert!(approx_eq(expected, 111_194.93, 0.01));
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // Helsinki to Tallinn is roughly 82 km
        let helsinki = GpsPoint::new(60.1699, 24.9384, 0);
        let tallinn = GpsPoint::new(59.4370, 24.7536, 0);
        assert!(approx_eq(haversine_distance(&helsinki, &tallinn), 82_000.0, 2_000.0));
    }

    #[test]
    fn test_polyline_length_empty_and_single() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[GpsPoint::new(60.0, 24.0, 0)]), 0.0);
    }

    #[test]
    fn test_polyline_length_sums_segments() {
        let track = vec![
            GpsPoint::new(60.00, 24.00, 0),
            GpsPoint::new(60.00, 24.01, 1_000),
            GpsPoint::new(60.00, 24.02, 2_000),
        ];
        let single = haversine_distance(&track[0], &track[1]);
        assert!(approx_eq(polyline_length(&track), 2.0 * single, 1e-6));
    }

    #[test]
    fn test_compute_bounds() {
        let track = vec![
            GpsPoint::new(60.00, 24.02, 0),
            GpsPoint::new(60.01, 24.00, 0),
            GpsPoint::new(60.005, 24.01, 0),
        ];
        let bounds = compute_bounds(&track).unwrap();
        assert_eq!(bounds.min_lat, 60.00);
        assert_eq!(bounds.max_lat, 60.01);
        assert_eq!(bounds.min_lng, 24.00);
        assert_eq!(bounds.max_lng, 24.02);
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(compute_bounds(&[]).is_none());
    }
}
