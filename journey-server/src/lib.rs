//! Travel journal server.
//!
//! Records the stops of a journey, draws them on a map and reports the
//! great-circle distance travelled.

pub mod cache;
pub mod config;
pub mod domain;
pub mod geocode;
pub mod journal;
pub mod route;
pub mod supabase;
pub mod web;
