//! Row types for the `locations` and `journal_entries` tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;

/// A row of the `locations` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl LocationRow {
    /// The stored coordinates, taken as-is.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new_unchecked(self.latitude, self.longitude)
    }
}

/// A row of the `journal_entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub location_id: String,
    /// Day the place was visited; older rows only have `created_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Embedded location, when selected with `location:locations(*)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationRow>,
}

impl JournalEntryRow {
    /// The visit date, falling back to the creation date.
    pub fn date(&self) -> NaiveDate {
        self.visited_on
            .unwrap_or_else(|| self.created_at.date_naive())
    }
}

/// Insert payload for `locations`.
#[derive(Debug, Clone, Serialize)]
pub struct NewLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Insert payload for `journal_entries`.
#[derive(Debug, Clone, Serialize)]
pub struct NewJournalEntry {
    pub title: String,
    pub content: String,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visited_on: Option<NaiveDate>,
}

/// Partial update for `journal_entries`. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited_on: Option<NaiveDate>,
}
