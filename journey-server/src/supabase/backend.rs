//! Storage backend selection.

use crate::domain::AccessToken;

use super::client::SupabaseClient;
use super::error::SupabaseError;
use super::memory::MemoryStore;
use super::types::{
    JournalEntryRow, JournalEntryUpdate, LocationRow, NewJournalEntry, NewLocation,
};

/// Where journal data lives.
///
/// The hosted store checks the session token itself; the in-memory
/// store accepts any token it is handed.
#[derive(Debug, Clone)]
pub enum Backend {
    Supabase(SupabaseClient),
    Memory(MemoryStore),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Supabase(_) => "supabase",
            Backend::Memory(_) => "memory",
        }
    }

    pub async fn get_locations(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<LocationRow>, SupabaseError> {
        match self {
            Backend::Supabase(client) => client.get_locations(token).await,
            Backend::Memory(store) => store.get_locations().await,
        }
    }

    pub async fn create_location(
        &self,
        token: &AccessToken,
        location: &NewLocation,
    ) -> Result<LocationRow, SupabaseError> {
        match self {
            Backend::Supabase(client) => client.create_location(token, location).await,
            Backend::Memory(store) => store.create_location(location).await,
        }
    }

    pub async fn get_journal_entries(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<JournalEntryRow>, SupabaseError> {
        match self {
            Backend::Supabase(client) => client.get_journal_entries(token).await,
            Backend::Memory(store) => store.get_journal_entries().await,
        }
    }

    pub async fn create_journal_entry(
        &self,
        token: &AccessToken,
        entry: &NewJournalEntry,
    ) -> Result<JournalEntryRow, SupabaseError> {
        match self {
            Backend::Supabase(client) => client.create_journal_entry(token, entry).await,
            Backend::Memory(store) => store.create_journal_entry(entry).await,
        }
    }

    pub async fn update_journal_entry(
        &self,
        token: &AccessToken,
        id: &str,
        update: &JournalEntryUpdate,
    ) -> Result<JournalEntryRow, SupabaseError> {
        match self {
            Backend::Supabase(client) => client.update_journal_entry(token, id, update).await,
            Backend::Memory(store) => store.update_journal_entry(id, update).await,
        }
    }

    pub async fn delete_journal_entry(
        &self,
        token: &AccessToken,
        id: &str,
    ) -> Result<(), SupabaseError> {
        match self {
            Backend::Supabase(client) => client.delete_journal_entry(token, id).await,
            Backend::Memory(store) => store.delete_journal_entry(id).await,
        }
    }

    pub async fn delete_location(&self, token: &AccessToken, id: &str) -> Result<(), SupabaseError> {
        match self {
            Backend::Supabase(client) => client.delete_location(token, id).await,
            Backend::Memory(store) => store.delete_location(id).await,
        }
    }
}

impl From<SupabaseClient> for Backend {
    fn from(client: SupabaseClient) -> Self {
        Backend::Supabase(client)
    }
}

impl From<MemoryStore> for Backend {
    fn from(store: MemoryStore) -> Self {
        Backend::Memory(store)
    }
}
