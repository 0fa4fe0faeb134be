//! Route distance and map geometry.
//!
//! A route is an ordered slice of stops. Its length is the sum of the
//! great-circle distances between consecutive stops, in route order.

mod distance;
mod map;

pub use distance::{
    EARTH_RADIUS_KM, distance_between, segment_distances, total_distance, total_distance_exact,
};
pub use map::{DEFAULT_CENTER, DEFAULT_ZOOM, Marker, RouteMap};
