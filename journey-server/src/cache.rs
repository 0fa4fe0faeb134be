//! Caching layer for geocoding lookups.
//!
//! The public Nominatim instance asks clients to cache results and stay
//! under one request per second. Autocomplete sends the same prefixes
//! over and over, so answers are cached by normalised query.
//!
//! Failed lookups are not cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{debug, warn};

use crate::geocode::{GeocodeError, NominatimClient, Suggestion};

/// Cached suggestion list.
type SuggestionEntry = Arc<Vec<Suggestion>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 1000,
        }
    }
}

/// Cache key for a query: trimmed, inner whitespace collapsed, lower-cased.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Cache for geocoding responses.
pub struct GeocodeCache {
    suggestions: MokaCache<String, SuggestionEntry>,
}

impl GeocodeCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let suggestions = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { suggestions }
    }

    pub async fn get(&self, key: &str) -> Option<SuggestionEntry> {
        self.suggestions.get(key).await
    }

    pub async fn insert(&self, key: String, entry: SuggestionEntry) {
        self.suggestions.insert(key, entry).await;
    }
}

/// Geocoder with caching.
///
/// Wraps a `NominatimClient`. A service error status degrades to an
/// empty suggestion list; transport errors are returned.
pub struct CachedGeocoder {
    client: NominatimClient,
    cache: GeocodeCache,
}

impl CachedGeocoder {
    /// Create a new cached geocoder.
    pub fn new(client: NominatimClient, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: GeocodeCache::new(cache_config),
        }
    }

    /// Suggestions for a free-text query, using the cache if possible.
    pub async fn search(&self, query: &str) -> Result<SuggestionEntry, GeocodeError> {
        let key = normalize_query(query);
        if key.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }

        if let Some(cached) = self.cache.get(&key).await {
            debug!(query = %key, "geocode cache hit");
            return Ok(cached);
        }

        let suggestions = match self.client.search(&key).await {
            Ok(s) => s,
            Err(GeocodeError::Api { status }) => {
                warn!(query = %key, status, "geocoder refused query");
                return Ok(Arc::new(Vec::new()));
            }
            Err(e) => return Err(e),
        };

        let entry = Arc::new(suggestions);
        self.cache.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// The best match for a query, if any.
    pub async fn resolve(&self, query: &str) -> Result<Option<Suggestion>, GeocodeError> {
        let suggestions = self.search(query).await?;
        Ok(suggestions.first().cloned())
    }

    /// Pre-populate the cache (fixtures, offline mode).
    pub async fn prime(&self, query: &str, suggestions: Vec<Suggestion>) {
        self.cache
            .insert(normalize_query(query), Arc::new(suggestions))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;
    use crate::geocode::GeocoderConfig;

    /// A client whose requests can never succeed.
    fn offline_client() -> NominatimClient {
        NominatimClient::new(GeocoderConfig::new().with_base_url("http://127.0.0.1:9")).unwrap()
    }

    fn rome() -> Suggestion {
        Suggestion {
            display_name: "Rome, Lazio, Italy".into(),
            point: GeoPoint::new(41.9028, 12.4964).unwrap(),
        }
    }

    #[test]
    fn normalizes_queries() {
        assert_eq!(normalize_query("  Rome,   Italy "), "rome, italy");
        assert_eq!(normalize_query("PARIS"), "paris");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn primed_query_served_from_cache() {
        let geocoder = CachedGeocoder::new(offline_client(), &CacheConfig::default());
        geocoder.prime("Rome", vec![rome()]).await;

        // Different spelling, same key; the offline client is never hit
        let hits = geocoder.search("  rome ").await.unwrap();
        assert_eq!(hits.as_slice(), &[rome()]);

        let best = geocoder.resolve("ROME").await.unwrap();
        assert_eq!(best, Some(rome()));
    }

    #[tokio::test]
    async fn blank_query_is_empty() {
        let geocoder = CachedGeocoder::new(offline_client(), &CacheConfig::default());
        assert!(geocoder.search("").await.unwrap().is_empty());
        assert_eq!(geocoder.resolve(" ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let geocoder = CachedGeocoder::new(offline_client(), &CacheConfig::default());
        assert!(geocoder.search("Atlantis").await.is_err());
    }
}
