//! Map view of a route: centre, polyline and markers.
//!
//! Built from the same ordered slice as the distance so the drawn line
//! and the reported total always agree.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{GeoPoint, Stop};

/// Map centre when the route has no stops (Paris).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new_unchecked(48.8566, 2.3522);

/// Initial zoom level for the map.
pub const DEFAULT_ZOOM: u8 = 4;

/// A marker popup for one stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub position: GeoPoint,
    pub location: String,
    pub date: NaiveDate,
    pub description: String,
}

/// Everything the browser needs to draw the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMap {
    pub center: GeoPoint,
    pub zoom: u8,
    /// Stop positions in route order
    pub polyline: Vec<GeoPoint>,
    pub markers: Vec<Marker>,
}

impl RouteMap {
    pub fn from_stops(stops: &[Stop]) -> Self {
        let center = stops.first().map(|s| s.point).unwrap_or(DEFAULT_CENTER);

        let markers = stops
            .iter()
            .map(|s| Marker {
                id: s.id.to_string(),
                position: s.point,
                location: s.location.clone(),
                date: s.date,
                description: s.description.clone(),
            })
            .collect();

        Self {
            center,
            zoom: DEFAULT_ZOOM,
            polyline: stops.iter().map(|s| s.point).collect(),
            markers,
        }
    }
}
