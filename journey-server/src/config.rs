//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `127.0.0.1:3000` |
//! | `STATIC_DIR` | `static` |
//! | `JOURNEY_BACKEND` | `supabase` if `SUPABASE_URL` is set, else `memory` |
//! | `SUPABASE_URL`, `SUPABASE_ANON_KEY` | required for `supabase` |
//! | `JOURNEY_SNAPSHOT` | unset (memory store is not persisted) |
//! | `NOMINATIM_URL` | public Nominatim |
//! | `NOMINATIM_USER_AGENT` | `journey-server/<version>` |
//! | `GEOCODE_CACHE_TTL_SECS` | `3600` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::geocode::GeocoderConfig;
use crate::supabase::SupabaseConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Which journal store to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Supabase,
    Memory,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(BackendKind::Supabase),
            "memory" => Ok(BackendKind::Memory),
            other => Err(ConfigError::Invalid {
                var: "JOURNEY_BACKEND",
                message: format!("expected \"supabase\" or \"memory\", got {other:?}"),
            }),
        }
    }
}

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: String,
    pub backend: BackendKind,
    /// Set when `backend` is `Supabase`
    pub supabase: Option<SupabaseConfig>,
    pub snapshot: Option<PathBuf>,
    pub geocoder: GeocoderConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let static_dir = get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        let supabase_url = get("SUPABASE_URL");
        let backend = match get("JOURNEY_BACKEND") {
            Some(kind) => kind.parse()?,
            None if supabase_url.is_some() => BackendKind::Supabase,
            None => BackendKind::Memory,
        };

        let supabase = match backend {
            BackendKind::Supabase => {
                let url = supabase_url.ok_or(ConfigError::Missing("SUPABASE_URL"))?;
                let key = get("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;
                Some(SupabaseConfig::new(url, key))
            }
            BackendKind::Memory => None,
        };

        let mut geocoder = GeocoderConfig::default();
        if let Some(url) = get("NOMINATIM_URL") {
            geocoder = geocoder.with_base_url(url);
        }
        if let Some(agent) = get("NOMINATIM_USER_AGENT") {
            geocoder = geocoder.with_user_agent(agent);
        }

        let mut cache = CacheConfig::default();
        if let Some(ttl) = get("GEOCODE_CACHE_TTL_SECS") {
            let secs: u64 = ttl.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "GEOCODE_CACHE_TTL_SECS",
                message: format!("not a number of seconds: {ttl}"),
            })?;
            cache.ttl = Duration::from_secs(secs);
        }

        Ok(Self {
            bind_addr,
            static_dir,
            backend,
            supabase,
            snapshot: get("JOURNEY_SNAPSHOT").map(PathBuf::from),
            geocoder,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_to_memory_backend() {
        let config = config(&[]).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.static_dir, "static");
        assert_eq!(config.backend, BackendKind::Memory);
        assert!(config.supabase.is_none());
        assert!(config.snapshot.is_none());
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn supabase_url_selects_supabase() {
        let config = config(&[
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();

        assert_eq!(config.backend, BackendKind::Supabase);
        let supabase = config.supabase.unwrap();
        assert_eq!(supabase.url, "https://demo.supabase.co");
        assert_eq!(supabase.anon_key, "anon");
    }

    #[test]
    fn supabase_requires_key() {
        let err = config(&[("SUPABASE_URL", "https://demo.supabase.co")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPABASE_ANON_KEY"));

        let err = config(&[("JOURNEY_BACKEND", "supabase")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPABASE_URL"));
    }

    #[test]
    fn explicit_memory_backend_wins() {
        let config = config(&[
            ("JOURNEY_BACKEND", "Memory"),
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("JOURNEY_SNAPSHOT", "/tmp/journal.json"),
        ])
        .unwrap();

        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.snapshot, Some(PathBuf::from("/tmp/journal.json")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("JOURNEY_BACKEND", "sqlite")]),
            Err(ConfigError::Invalid { var: "JOURNEY_BACKEND", .. })
        ));
        assert!(matches!(
            config(&[("BIND_ADDR", "localhost")]),
            Err(ConfigError::Invalid { var: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("GEOCODE_CACHE_TTL_SECS", "soon")]),
            Err(ConfigError::Invalid { var: "GEOCODE_CACHE_TTL_SECS", .. })
        ));
    }

    #[test]
    fn geocoder_overrides() {
        let config = config(&[
            ("NOMINATIM_URL", "http://localhost:8088"),
            ("NOMINATIM_USER_AGENT", "my-journal/2.0 (me@example.com)"),
            ("GEOCODE_CACHE_TTL_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.geocoder.base_url, "http://localhost:8088");
        assert_eq!(config.geocoder.user_agent, "my-journal/2.0 (me@example.com)");
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config(&[("SUPABASE_URL", "  "), ("BIND_ADDR", "")]).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
    }
}
