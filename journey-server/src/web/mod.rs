//! Web layer for the travel journal.
//!
//! Serves the journal page and a JSON API for stops, place search and
//! distances.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, SESSION_COOKIE, create_router};
pub use state::AppState;
pub use templates::*;
