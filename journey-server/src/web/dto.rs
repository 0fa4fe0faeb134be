//! Data transfer objects for web requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Stop, StopFormErrors};
use crate::geocode::Suggestion;
use crate::journal::StopEdit;
use crate::route::{RouteMap, segment_distances, total_distance};

/// The whole journey, as returned by `GET /api/stops`.
#[derive(Debug, Serialize)]
pub struct StopsResponse {
    /// Stops in route order
    pub stops: Vec<Stop>,

    /// Total route length in whole kilometres
    pub total_distance_km: u64,

    /// Length of each leg between consecutive stops
    pub segments_km: Vec<f64>,

    /// Map centre, polyline and markers
    pub map: RouteMap,
}

impl StopsResponse {
    pub fn from_stops(stops: Vec<Stop>) -> Self {
        Self {
            total_distance_km: total_distance(&stops),
            segments_km: segment_distances(&stops),
            map: RouteMap::from_stops(&stops),
            stops,
        }
    }
}

/// Request to change a stop.
#[derive(Debug, Deserialize)]
pub struct EditStopRequest {
    /// New visit date, `YYYY-MM-DD`
    pub date: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl EditStopRequest {
    /// Check the supplied fields. Absent fields are left unchanged;
    /// present ones follow the same rules as the new-stop form.
    pub fn validate(&self) -> Result<StopEdit, StopFormErrors> {
        let mut errors = StopFormErrors::default();

        let date = match self.date.as_deref().map(str::trim) {
            None => None,
            Some("") => {
                errors.date = Some("Please select a date");
                None
            }
            Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.date = Some("Please select a valid date");
                    None
                }
            },
        };

        let description = match self.description.as_deref().map(str::trim) {
            None => None,
            Some("") => {
                errors.description = Some("Please enter a description");
                None
            }
            Some(s) => Some(s.to_string()),
        };

        if errors.is_empty() {
            Ok(StopEdit { date, description })
        } else {
            Err(errors)
        }
    }
}

/// Query for `GET /api/geocode`.
#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    #[serde(default)]
    pub q: String,
}

/// Autocomplete suggestions.
#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub suggestions: Vec<Suggestion>,
}

/// Query for `GET /api/distance`.
#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    /// `lat,lng`
    pub from: String,

    /// `lat,lng`
    pub to: String,
}

/// Great-circle distance between two points.
#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub km: f64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Per-field form errors, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<StopFormErrors>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, StopId};

    fn stop(id: &str, lat: f64, lon: f64) -> Stop {
        Stop {
            id: StopId::new(id),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            location: id.to_string(),
            point: GeoPoint::new(lat, lon).unwrap(),
            description: String::new(),
        }
    }

    #[test]
    fn stops_response_totals() {
        let response = StopsResponse::from_stops(vec![
            stop("paris", 48.8566, 2.3522),
            stop("rome", 41.9028, 12.4964),
        ]);

        assert_eq!(response.total_distance_km, 1105);
        assert_eq!(response.segments_km.len(), 1);
        assert_eq!(response.map.polyline.len(), 2);
    }

    #[test]
    fn empty_journey() {
        let response = StopsResponse::from_stops(vec![]);
        assert_eq!(response.total_distance_km, 0);
        assert!(response.segments_km.is_empty());
    }

    #[test]
    fn error_response_omits_missing_fields() {
        let json = serde_json::to_value(ErrorResponse {
            error: "nope".into(),
            fields: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "error": "nope" }));
    }

    #[test]
    fn edit_request_validation() {
        let edit = EditStopRequest {
            date: Some(" 2024-02-01 ".into()),
            description: None,
        }
        .validate()
        .unwrap();
        assert_eq!(edit.date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(edit.description, None);

        let errors = EditStopRequest {
            date: Some("yesterday".into()),
            description: Some("   ".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.date, Some("Please select a valid date"));
        assert_eq!(errors.description, Some("Please enter a description"));
    }
}
