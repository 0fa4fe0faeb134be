//! Nominatim search client.

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{GeoPoint, Located};

use super::error::GeocodeError;

/// Default base URL for the public Nominatim instance.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default `User-Agent`; Nominatim rejects anonymous clients.
const DEFAULT_USER_AGENT: &str = concat!("journey-server/", env!("CARGO_PKG_VERSION"));

/// Default number of suggestions per query.
const DEFAULT_LIMIT: u8 = 5;

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Identifies this application to the service
    pub user_agent: String,
    /// Maximum suggestions per query
    pub limit: u8,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL (for self-hosted instances or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the `User-Agent` sent with every request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the suggestion limit.
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            limit: DEFAULT_LIMIT,
            timeout_secs: 30,
        }
    }
}

/// A search hit as Nominatim returns it.
///
/// Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

/// A place matching a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub display_name: String,
    #[serde(flatten)]
    pub point: GeoPoint,
}

impl Located for Suggestion {
    fn point(&self) -> GeoPoint {
        self.point
    }
}

/// Convert raw hits, dropping any whose coordinates don't parse or are
/// out of range.
pub fn parse_places(places: Vec<NominatimPlace>) -> Vec<Suggestion> {
    places
        .into_iter()
        .filter_map(|p| {
            let lat = p.lat.trim().parse().ok()?;
            let lon = p.lon.trim().parse().ok()?;
            let point = GeoPoint::new(lat, lon).ok()?;
            Some(Suggestion {
                display_name: p.display_name,
                point,
            })
        })
        .collect()
}

/// Client for the Nominatim search API.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    limit: u8,
}

impl NominatimClient {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.limit,
        })
    }

    /// Search for places matching `query`.
    ///
    /// A blank query returns no suggestions without calling the service.
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.base_url);
        let limit = self.limit.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        trace!(query, hits = places.len(), "geocoded");
        Ok(parse_places(places))
    }
}
