//! Geocoding error types.

/// Errors from the geocoding service.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("geocoder returned {status}")]
    Api { status: u16 },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            GeocodeError::Api { status: 429 }.to_string(),
            "geocoder returned 429"
        );
        assert_eq!(
            GeocodeError::Json {
                message: "expected value".into()
            }
            .to_string(),
            "JSON parse error: expected value"
        );
    }
}
