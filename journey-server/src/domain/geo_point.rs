//! Geographic coordinate type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing a coordinate outside the valid ranges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A latitude/longitude pair in degrees.
///
/// Latitude lies in [-90, 90] and longitude in [-180, 180] for any value
/// built with [`GeoPoint::new`]. Values from trusted sources may skip the
/// check with [`GeoPoint::new_unchecked`].
///
/// Serialises as `{"lat": .., "lng": ..}`, the shape the map script reads.
///
/// # Examples
///
/// ```
/// use journey_server::domain::GeoPoint;
///
/// let paris = GeoPoint::new(48.8566, 2.3522).unwrap();
/// assert_eq!(paris.lat(), 48.8566);
///
/// // Latitude past the pole is rejected
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
///
/// // Longitude past the antimeridian is rejected
/// assert!(GeoPoint::new(0.0, -180.5).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    #[serde(rename = "lng")]
    lon: f64,
}

impl GeoPoint {
    /// Create a coordinate, validating both components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate {
                reason: "latitude and longitude must be finite",
            });
        }

        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within [-90, 90]",
            });
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within [-180, 180]",
            });
        }

        Ok(Self { lat, lon })
    }

    /// Create a coordinate without range checks.
    pub const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parse a `"lat,lng"` pair, as used in query strings.
    pub fn parse_pair(s: &str) -> Result<Self, InvalidCoordinate> {
        let (lat, lon) = s.split_once(',').ok_or(InvalidCoordinate {
            reason: "expected \"lat,lng\"",
        })?;
        let lat: f64 = lat.trim().parse().map_err(|_| InvalidCoordinate {
            reason: "latitude is not a number",
        })?;
        let lon: f64 = lon.trim().parse().map_err(|_| InvalidCoordinate {
            reason: "longitude is not a number",
        })?;
        Self::new(lat, lon)
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Anything positioned on the map.
///
/// Route computations accept any ordered slice of `Located` values, so
/// stops, raw points and view models can all be measured.
pub trait Located {
    fn point(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn point(&self) -> GeoPoint {
        *self
    }
}

impl<T: Located> Located for &T {
    fn point(&self) -> GeoPoint {
        (**self).point()
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_ranges() {
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::new(41.9028, 12.4964).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(GeoPoint::new(90.0001, 0.0).is_err());
        assert!(GeoPoint::new(-91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 180.0001).is_err());
        assert!(GeoPoint::new(0.0, -200.0).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn unchecked_skips_validation() {
        let p = GeoPoint::new_unchecked(120.0, 400.0);
        assert_eq!(p.lat(), 120.0);
        assert_eq!(p.lon(), 400.0);
    }

    #[test]
    fn parse_pair() {
        let p = GeoPoint::parse_pair("48.8566, 2.3522").unwrap();
        assert_eq!(p, GeoPoint::new(48.8566, 2.3522).unwrap());

        assert!(GeoPoint::parse_pair("48.8566").is_err());
        assert!(GeoPoint::parse_pair("abc,2.0").is_err());
        assert!(GeoPoint::parse_pair("95,2.0").is_err());
    }

    #[test]
    fn error_display() {
        let err = GeoPoint::new(100.0, 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid coordinate: latitude must be within [-90, 90]"
        );
    }

    #[test]
    fn display_and_debug() {
        let p = GeoPoint::new(48.8566, 2.3522).unwrap();
        assert_eq!(format!("{}", p), "48.8566, 2.3522");
        assert_eq!(format!("{:?}", p), "GeoPoint(48.8566, 2.3522)");
    }

    #[test]
    fn serializes_with_lng_key() {
        let p = GeoPoint::new(41.9028, 12.4964).unwrap();
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json, serde_json::json!({ "lat": 41.9028, "lng": 12.4964 }));

        let back: GeoPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range pair is accepted and preserved
        #[test]
        fn in_range_accepted(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let p = GeoPoint::new(lat, lon).unwrap();
            prop_assert_eq!(p.lat(), lat);
            prop_assert_eq!(p.lon(), lon);
        }

        /// Latitude beyond the poles is always rejected
        #[test]
        fn polar_overflow_rejected(lat in 90.0001f64..1000.0, lon in -180.0f64..=180.0) {
            prop_assert!(GeoPoint::new(lat, lon).is_err());
            prop_assert!(GeoPoint::new(-lat, lon).is_err());
        }
    }
}
