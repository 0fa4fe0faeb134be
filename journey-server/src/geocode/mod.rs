//! Free-text place search.
//!
//! Resolves location names to coordinates through a Nominatim search
//! endpoint. Results are cached by [`crate::cache::CachedGeocoder`].

mod client;
mod error;

pub use client::{GeocoderConfig, NominatimClient, NominatimPlace, Suggestion, parse_places};
pub use error::GeocodeError;
