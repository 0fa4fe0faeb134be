//! In-memory journal store for development and tests.
//!
//! Behaves like the hosted tables (ordering, foreign keys, embedded
//! locations) and can persist itself to a JSON snapshot on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::error::SupabaseError;
use super::types::{
    JournalEntryRow, JournalEntryUpdate, LocationRow, NewJournalEntry, NewLocation,
};

/// Table contents, also the snapshot file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    locations: Vec<LocationRow>,
    entries: Vec<JournalEntryRow>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:06}", self.next_id)
    }

    fn location(&self, id: &str) -> Option<&LocationRow> {
        self.locations.iter().find(|l| l.id == id)
    }

    fn with_location(&self, entry: &JournalEntryRow) -> JournalEntryRow {
        JournalEntryRow {
            location: self.location(&entry.location_id).cloned(),
            ..entry.clone()
        }
    }
}

/// Journal store held in memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// An empty store with no persistence.
    pub fn empty() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            snapshot: None,
        }
    }

    /// A store seeded with the demo journey (Paris, then Rome).
    pub fn demo() -> Self {
        Self {
            tables: Arc::new(RwLock::new(demo_tables())),
            snapshot: None,
        }
    }

    /// Open a store backed by a snapshot file.
    ///
    /// Loads the snapshot if it exists, otherwise starts from the demo
    /// journey. Every write is saved back to `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SupabaseError> {
        let path = path.into();

        let tables = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| SupabaseError::Snapshot {
                message: format!("failed to read {}: {}", path.display(), e),
            })?;
            serde_json::from_str(&contents).map_err(|e| SupabaseError::Snapshot {
                message: format!("failed to parse {}: {}", path.display(), e),
            })?
        } else {
            demo_tables()
        };

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
            snapshot: Some(path),
        })
    }

    /// Path of the backing snapshot, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    fn persist(&self, tables: &Tables) -> Result<(), SupabaseError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| SupabaseError::Snapshot {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(tables).map_err(|e| SupabaseError::Snapshot {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        std::fs::write(path, json).map_err(|e| SupabaseError::Snapshot {
            message: format!("failed to write snapshot: {}", e),
        })?;

        debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    /// All locations, newest first.
    pub async fn get_locations(&self) -> Result<Vec<LocationRow>, SupabaseError> {
        let tables = self.tables.read().await;
        let mut rows = tables.locations.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub async fn create_location(
        &self,
        location: &NewLocation,
    ) -> Result<LocationRow, SupabaseError> {
        self.commit(|tables| {
            let row = LocationRow {
                id: tables.next_id("loc"),
                name: location.name.clone(),
                latitude: location.latitude,
                longitude: location.longitude,
                created_at: Utc::now(),
            };
            tables.locations.push(row.clone());
            Ok(row)
        })
        .await
    }

    /// All journal entries with their location embedded, newest first.
    pub async fn get_journal_entries(&self) -> Result<Vec<JournalEntryRow>, SupabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .entries
            .iter()
            .map(|e| tables.with_location(e))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub async fn create_journal_entry(
        &self,
        entry: &NewJournalEntry,
    ) -> Result<JournalEntryRow, SupabaseError> {
        self.commit(|tables| {
            if tables.location(&entry.location_id).is_none() {
                return Err(foreign_key_violation(&entry.location_id));
            }

            let now = Utc::now();
            let row = JournalEntryRow {
                id: tables.next_id("entry"),
                title: entry.title.clone(),
                content: entry.content.clone(),
                location_id: entry.location_id.clone(),
                visited_on: entry.visited_on,
                created_at: now,
                updated_at: now,
                location: None,
            };
            tables.entries.push(row.clone());

            Ok(tables.with_location(&row))
        })
        .await
    }

    pub async fn update_journal_entry(
        &self,
        id: &str,
        update: &JournalEntryUpdate,
    ) -> Result<JournalEntryRow, SupabaseError> {
        self.commit(|tables| {
            if let Some(location_id) = &update.location_id
                && tables.location(location_id).is_none()
            {
                return Err(foreign_key_violation(location_id));
            }

            let entry = tables
                .entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| SupabaseError::NotFound(format!("journal entry {id}")))?;

            if let Some(title) = &update.title {
                entry.title = title.clone();
            }
            if let Some(content) = &update.content {
                entry.content = content.clone();
            }
            if let Some(location_id) = &update.location_id {
                entry.location_id = location_id.clone();
            }
            if let Some(visited_on) = update.visited_on {
                entry.visited_on = Some(visited_on);
            }
            entry.updated_at = Utc::now();

            let row = entry.clone();
            Ok(tables.with_location(&row))
        })
        .await
    }

    /// Delete an entry. Deleting a missing id is not an error.
    pub async fn delete_journal_entry(&self, id: &str) -> Result<(), SupabaseError> {
        self.commit(|tables| {
            tables.entries.retain(|e| e.id != id);
            Ok(())
        })
        .await
    }

    /// Delete a location that no entry references.
    pub async fn delete_location(&self, id: &str) -> Result<(), SupabaseError> {
        self.commit(|tables| {
            if tables.entries.iter().any(|e| e.location_id == id) {
                return Err(foreign_key_violation(id));
            }
            tables.locations.retain(|l| l.id != id);
            Ok(())
        })
        .await
    }

    /// Apply `change` to a copy of the tables, save the copy, then make it
    /// live. A failed change or save leaves the store as it was.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Tables) -> Result<T, SupabaseError>,
    ) -> Result<T, SupabaseError> {
        let mut tables = self.tables.write().await;

        let mut next = tables.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;

        *tables = next;
        Ok(out)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::demo()
    }
}

fn foreign_key_violation(location_id: &str) -> SupabaseError {
    SupabaseError::Api {
        status: 409,
        message: format!("foreign key violation on location {location_id}"),
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn demo_tables() -> Tables {
    let demo = [
        (
            "Paris, France",
            48.8566,
            2.3522,
            NaiveDate::from_ymd_opt(2024, 1, 15),
            "Started the journey at the Eiffel Tower. The city of lights never disappoints.",
        ),
        (
            "Rome, Italy",
            41.9028,
            12.4964,
            NaiveDate::from_ymd_opt(2024, 1, 18),
            "Explored the Colosseum and Vatican City. Ancient history comes alive here.",
        ),
    ];

    let mut tables = Tables::default();
    for (name, latitude, longitude, date, content) in demo {
        let Some(date) = date else { continue };
        let at = midnight(date);

        let location_id = tables.next_id("loc");
        tables.locations.push(LocationRow {
            id: location_id.clone(),
            name: name.to_string(),
            latitude,
            longitude,
            created_at: at,
        });

        let entry_id = tables.next_id("entry");
        tables.entries.push(JournalEntryRow {
            id: entry_id,
            title: name.to_string(),
            content: content.to_string(),
            location_id,
            visited_on: Some(date),
            created_at: at,
            updated_at: at,
            location: None,
        });
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_location(name: &str) -> NewLocation {
        NewLocation {
            name: name.to_string(),
            latitude: 52.52,
            longitude: 13.405,
        }
    }

    #[tokio::test]
    async fn demo_has_paris_and_rome() {
        let store = MemoryStore::demo();

        let entries = store.get_journal_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first
        assert_eq!(entries[0].title, "Rome, Italy");
        assert_eq!(entries[1].title, "Paris, France");
        assert!(entries.iter().all(|e| e.location.is_some()));

        let locations = store.get_locations().await.unwrap();
        assert_eq!(locations.len(), 2);
    }

    #[tokio::test]
    async fn create_entry_embeds_location() {
        let store = MemoryStore::empty();
        let location = store.create_location(&new_location("Berlin")).await.unwrap();

        let entry = store
            .create_journal_entry(&NewJournalEntry {
                title: "Berlin".into(),
                content: "Brandenburg Gate".into(),
                location_id: location.id.clone(),
                visited_on: None,
            })
            .await
            .unwrap();

        assert_eq!(entry.location, Some(location));
    }

    #[tokio::test]
    async fn entry_requires_existing_location() {
        let store = MemoryStore::empty();
        let result = store
            .create_journal_entry(&NewJournalEntry {
                title: "Nowhere".into(),
                content: String::new(),
                location_id: "loc-missing".into(),
                visited_on: None,
            })
            .await;

        assert!(matches!(result, Err(SupabaseError::Api { status: 409, .. })));
    }

    #[tokio::test]
    async fn update_applies_partial_changes() {
        let store = MemoryStore::demo();
        let entries = store.get_journal_entries().await.unwrap();
        let target = &entries[0];

        let updated = store
            .update_journal_entry(
                &target.id,
                &JournalEntryUpdate {
                    content: Some("Gelato".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, "Gelato");
        assert_eq!(updated.title, target.title);
        assert!(updated.updated_at >= target.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_entry_is_not_found() {
        let store = MemoryStore::demo();
        let result = store
            .update_journal_entry("entry-999999", &JournalEntryUpdate::default())
            .await;
        assert!(matches!(result, Err(SupabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn referenced_location_cannot_be_deleted() {
        let store = MemoryStore::demo();
        let entries = store.get_journal_entries().await.unwrap();
        let location_id = entries[0].location_id.clone();

        assert!(store.delete_location(&location_id).await.is_err());

        store.delete_journal_entry(&entries[0].id).await.unwrap();
        store.delete_location(&location_id).await.unwrap();
        assert_eq!(store.get_locations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.json");

        let store = MemoryStore::open(&path).unwrap();
        store.create_location(&new_location("Berlin")).await.unwrap();
        assert!(path.exists());

        let reopened = MemoryStore::open(&path).unwrap();
        let names: Vec<String> = reopened
            .get_locations()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"Berlin".to_string()));
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            MemoryStore::open(&path),
            Err(SupabaseError::Snapshot { .. })
        ));
    }

    #[tokio::test]
    async fn failed_save_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("journal.json");
        let store = MemoryStore::open(&path).unwrap();

        // A plain file where the snapshot directory should be
        std::fs::write(dir.path().join("sub"), "").unwrap();

        let result = store.create_location(&new_location("Berlin")).await;
        assert!(matches!(result, Err(SupabaseError::Snapshot { .. })));
        assert_eq!(store.get_locations().await.unwrap().len(), 2);

        let entries = store.get_journal_entries().await.unwrap();
        assert!(store.delete_journal_entry(&entries[0].id).await.is_err());
        assert_eq!(store.get_journal_entries().await.unwrap().len(), 2);
    }
}
