//! Domain types for the travel journal.
//!
//! This module contains the core domain model types. Types that carry
//! invariants enforce them at construction time, so code that receives
//! them can trust their validity.

mod auth;
mod error;
mod geo_point;
mod stop;

pub use auth::{AccessToken, AuthState};
pub use error::DomainError;
pub use geo_point::{GeoPoint, InvalidCoordinate, Located};
pub use stop::{NewStop, Stop, StopFormErrors, StopId, ValidStop};
