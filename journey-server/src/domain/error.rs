//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from API/IO errors.

use super::InvalidCoordinate;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A coordinate outside the valid latitude/longitude ranges
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// A journal entry points at a location that does not exist
    #[error("entry {entry} references missing location {location}")]
    DanglingLocation { entry: String, location: String },
}
