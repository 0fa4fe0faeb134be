//! Journal workflow errors.

use crate::domain::StopId;
use crate::supabase::SupabaseError;

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// The caller has no usable session
    #[error("not signed in")]
    Unauthenticated,

    /// No stop with this id
    #[error("stop {0} not found")]
    NotFound(StopId),

    /// The store failed
    #[error(transparent)]
    Store(#[from] SupabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(JournalError::Unauthenticated.to_string(), "not signed in");
        assert_eq!(
            JournalError::NotFound(StopId::new("e7")).to_string(),
            "stop e7 not found"
        );
        assert_eq!(
            JournalError::from(SupabaseError::Unauthorized).to_string(),
            "unauthorized: session token rejected"
        );
    }
}
