//! Great-circle distances along a route.

use crate::domain::{GeoPoint, Located};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
///
/// Inputs are not range-checked. Longitude differences wrapping past
/// ±180° still yield the shorter arc.
///
/// # Examples
///
/// ```
/// use journey_server::domain::GeoPoint;
/// use journey_server::route::distance_between;
///
/// let paris = GeoPoint::new(48.8566, 2.3522).unwrap();
/// let rome = GeoPoint::new(41.9028, 12.4964).unwrap();
///
/// let km = distance_between(paris, rome);
/// assert_eq!(km.round(), 1105.0);
/// assert_eq!(distance_between(paris, paris), 0.0);
/// ```
pub fn distance_between(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push near-antipodal pairs just over 1
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance of each consecutive segment, in route order.
///
/// A route of `n` stops has `n - 1` segments; fewer than two stops
/// have none.
pub fn segment_distances<L: Located>(route: &[L]) -> Vec<f64> {
    route
        .windows(2)
        .map(|pair| distance_between(pair[0].point(), pair[1].point()))
        .collect()
}

/// Unrounded total path length, in kilometres.
pub fn total_distance_exact<L: Located>(route: &[L]) -> f64 {
    route
        .windows(2)
        .map(|pair| distance_between(pair[0].point(), pair[1].point()))
        .sum()
}

/// Total path length in whole kilometres.
///
/// Sums consecutive segments first and rounds once at the end. Empty and
/// single-stop routes are 0.
pub fn total_distance<L: Located>(route: &[L]) -> u64 {
    if route.len() < 2 {
        return 0;
    }

    total_distance_exact(route).round() as u64
}
