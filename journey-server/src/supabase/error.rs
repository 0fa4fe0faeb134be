//! Journal store error types.

/// Errors that can occur when talking to the journal store.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token rejected by the store
    #[error("unauthorized: session token rejected")]
    Unauthorized,

    /// No row matched the request
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Reading or writing the local snapshot failed
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}
