//! Journal stops: joining store rows into a route, and the add, edit
//! and delete workflows.

mod error;
mod join;
mod service;

pub use error::JournalError;
pub use join::{Joined, join_stops};
pub use service::{DeleteOutcome, JournalService, StopEdit};
