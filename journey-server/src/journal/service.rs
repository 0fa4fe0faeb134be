//! Stop workflows over the journal store.

use chrono::NaiveDate;
use futures::future::try_join;
use tracing::{debug, info, warn};

use crate::domain::{AccessToken, AuthState, GeoPoint, Stop, StopId, ValidStop};
use crate::supabase::{Backend, JournalEntryUpdate, NewJournalEntry, NewLocation, SupabaseError};

use super::error::JournalError;
use super::join::join_stops;

/// Changes to an existing stop. `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopEdit {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// What a delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Whether the stop's location went too (no other stop used it)
    pub location_removed: bool,
}

/// Reads and writes journal stops for an authenticated caller.
#[derive(Debug, Clone)]
pub struct JournalService {
    backend: Backend,
}

fn require(auth: &AuthState) -> Result<&AccessToken, JournalError> {
    auth.token().ok_or(JournalError::Unauthenticated)
}

impl JournalService {
    pub fn new(backend: impl Into<Backend>) -> Self {
        Self {
            backend: backend.into(),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// All stops in route order.
    ///
    /// Entries and locations are fetched concurrently and joined; entries
    /// whose location is missing are left out.
    pub async fn list_stops(&self, auth: &AuthState) -> Result<Vec<Stop>, JournalError> {
        let token = require(auth)?;

        let (entries, locations) = try_join(
            self.backend.get_journal_entries(token),
            self.backend.get_locations(token),
        )
        .await?;

        let joined = join_stops(&entries, &locations);
        for skipped in &joined.skipped {
            debug!(%skipped, "entry excluded from route");
        }

        Ok(joined.stops)
    }

    /// Record a new stop at `point`.
    pub async fn add_stop(
        &self,
        auth: &AuthState,
        stop: ValidStop,
        point: GeoPoint,
    ) -> Result<Stop, JournalError> {
        let token = require(auth)?;

        let location = self
            .backend
            .create_location(
                token,
                &NewLocation {
                    name: stop.location.clone(),
                    latitude: point.lat(),
                    longitude: point.lon(),
                },
            )
            .await?;

        let entry = match self
            .backend
            .create_journal_entry(
                token,
                &NewJournalEntry {
                    title: stop.location.clone(),
                    content: stop.description.clone(),
                    location_id: location.id.clone(),
                    visited_on: Some(stop.date),
                },
            )
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                // Nothing refers to the new location yet
                if let Err(cleanup) = self.backend.delete_location(token, &location.id).await {
                    warn!(location = %location.id, error = %cleanup, "orphaned location left behind");
                }
                return Err(e.into());
            }
        };

        info!(stop = %entry.id, location = %location.name, "stop added");

        let point = location.point();
        Ok(Stop {
            id: StopId::new(entry.id),
            date: stop.date,
            location: location.name,
            point,
            description: entry.content,
        })
    }

    /// Change the date or description of a stop.
    pub async fn edit_stop(
        &self,
        auth: &AuthState,
        id: &StopId,
        edit: StopEdit,
    ) -> Result<Stop, JournalError> {
        let token = require(auth)?;

        let update = JournalEntryUpdate {
            content: edit.description,
            visited_on: edit.date,
            ..Default::default()
        };

        let entry = self
            .backend
            .update_journal_entry(token, id.as_str(), &update)
            .await
            .map_err(|e| match e {
                SupabaseError::NotFound(_) => JournalError::NotFound(id.clone()),
                other => JournalError::Store(other),
            })?;

        let location = entry
            .location
            .as_ref()
            .ok_or_else(|| JournalError::NotFound(id.clone()))?;

        Ok(Stop {
            id: id.clone(),
            date: entry.date(),
            location: location.name.clone(),
            point: location.point(),
            description: entry.content.clone(),
        })
    }

    /// Delete a stop, and its location if no other stop refers to it.
    pub async fn delete_stop(
        &self,
        auth: &AuthState,
        id: &StopId,
    ) -> Result<DeleteOutcome, JournalError> {
        let token = require(auth)?;

        let entries = self.backend.get_journal_entries(token).await?;
        let target = entries
            .iter()
            .find(|e| e.id == id.as_str())
            .ok_or_else(|| JournalError::NotFound(id.clone()))?;

        self.backend.delete_journal_entry(token, &target.id).await?;

        let still_used = entries
            .iter()
            .any(|e| e.id != target.id && e.location_id == target.location_id);

        if !still_used {
            self.backend
                .delete_location(token, &target.location_id)
                .await?;
        }

        info!(stop = %id, location_removed = !still_used, "stop deleted");

        Ok(DeleteOutcome {
            location_removed: !still_used,
        })
    }
}
