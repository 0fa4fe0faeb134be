//! Journey stops and the form used to create them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::geo_point::{GeoPoint, Located};

/// Identifier of a stop, as assigned by the journal store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dated, described location visited on a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub date: NaiveDate,
    /// Human-readable place name, e.g. "Paris, France"
    pub location: String,
    #[serde(rename = "coordinates")]
    pub point: GeoPoint,
    pub description: String,
}

impl Located for Stop {
    fn point(&self) -> GeoPoint {
        self.point
    }
}

/// Raw "new stop" form input, before validation.
///
/// Coordinates are optional: a form filled in through the autocomplete
/// carries them, a free-text one is geocoded later.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStop {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A stop form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidStop {
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub point: Option<GeoPoint>,
}

/// Per-field validation messages for the stop form.
///
/// A `None` field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid stop form")]
pub struct StopFormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<&'static str>,
}

impl StopFormErrors {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.coordinates.is_none()
    }
}

impl NewStop {
    /// Validate the form.
    ///
    /// Date, location and description are required; whitespace-only
    /// counts as missing. Coordinates must be given as a pair.
    pub fn validate(&self) -> Result<ValidStop, StopFormErrors> {
        let mut errors = StopFormErrors::default();

        let date = match self.date.trim() {
            "" => {
                errors.date = Some("Please select a date");
                None
            }
            s => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.date = Some("Please select a valid date");
                    None
                }
            },
        };

        let location = self.location.trim();
        if location.is_empty() {
            errors.location = Some("Please enter a location");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.description = Some("Please enter a description");
        }

        let point = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => match GeoPoint::new(lat, lng) {
                Ok(p) => Some(p),
                Err(_) => {
                    errors.coordinates = Some("Coordinates are out of range");
                    None
                }
            },
            (None, None) => None,
            _ => {
                errors.coordinates = Some("Both latitude and longitude are required");
                None
            }
        };

        match date {
            Some(date) if errors.is_empty() => Ok(ValidStop {
                date,
                location: location.to_string(),
                description: description.to_string(),
                point,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(date: &str, location: &str, description: &str) -> NewStop {
        NewStop {
            date: date.to_string(),
            location: location.to_string(),
            description: description.to_string(),
            lat: None,
            lng: None,
        }
    }

    #[test]
    fn valid_form_without_coordinates() {
        let stop = form("2024-01-15", " Paris, France ", "Eiffel Tower")
            .validate()
            .unwrap();

        assert_eq!(stop.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(stop.location, "Paris, France");
        assert_eq!(stop.description, "Eiffel Tower");
        assert!(stop.point.is_none());
    }

    #[test]
    fn valid_form_with_coordinates() {
        let mut f = form("2024-01-18", "Rome, Italy", "Colosseum");
        f.lat = Some(41.9028);
        f.lng = Some(12.4964);

        let stop = f.validate().unwrap();
        assert_eq!(stop.point, Some(GeoPoint::new(41.9028, 12.4964).unwrap()));
    }

    #[test]
    fn all_fields_missing() {
        let errors = form("", "  ", "").validate().unwrap_err();

        assert_eq!(errors.date, Some("Please select a date"));
        assert_eq!(errors.location, Some("Please enter a location"));
        assert_eq!(errors.description, Some("Please enter a description"));
        assert_eq!(errors.coordinates, None);
    }

    #[test]
    fn only_failing_fields_reported() {
        let errors = form("2024-01-15", "Paris", "").validate().unwrap_err();

        assert_eq!(errors.date, None);
        assert_eq!(errors.location, None);
        assert_eq!(errors.description, Some("Please enter a description"));
    }

    #[test]
    fn malformed_date() {
        let errors = form("15/01/2024", "Paris", "x").validate().unwrap_err();
        assert_eq!(errors.date, Some("Please select a valid date"));
    }

    #[test]
    fn half_coordinate_pair_rejected() {
        let mut f = form("2024-01-15", "Paris", "x");
        f.lat = Some(48.0);

        let errors = f.validate().unwrap_err();
        assert_eq!(
            errors.coordinates,
            Some("Both latitude and longitude are required")
        );
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        let mut f = form("2024-01-15", "Paris", "x");
        f.lat = Some(148.0);
        f.lng = Some(2.0);

        let errors = f.validate().unwrap_err();
        assert_eq!(errors.coordinates, Some("Coordinates are out of range"));
    }

    #[test]
    fn errors_serialize_only_failures() {
        let errors = form("2024-01-15", "", "x").validate().unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "location": "Please enter a location" })
        );
    }

    #[test]
    fn stop_serializes_coordinates() {
        let stop = Stop {
            id: StopId::new("1"),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            location: "Paris, France".to_string(),
            point: GeoPoint::new(48.8566, 2.3522).unwrap(),
            description: "Eiffel Tower".to_string(),
        };

        let json = serde_json::to_value(&stop).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["coordinates"]["lat"], 48.8566);
        assert_eq!(json["coordinates"]["lng"], 2.3522);
    }
}
