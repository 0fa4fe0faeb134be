//! Journal persistence.
//!
//! Locations and journal entries live in two Supabase tables, reached
//! through the PostgREST interface. An in-memory store with the same
//! behaviour backs local development and tests.

mod backend;
mod client;
mod error;
mod memory;
mod types;

pub use backend::Backend;
pub use client::{SupabaseClient, SupabaseConfig};
pub use error::SupabaseError;
pub use memory::MemoryStore;
pub use types::{JournalEntryRow, JournalEntryUpdate, LocationRow, NewJournalEntry, NewLocation};
