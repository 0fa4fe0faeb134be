//! Joining journal entries with their locations.

use std::collections::HashMap;

use crate::domain::{DomainError, Stop, StopId};
use crate::supabase::{JournalEntryRow, LocationRow};

/// Result of joining entries against locations.
#[derive(Debug, Clone, Default)]
pub struct Joined {
    /// Stops in route order
    pub stops: Vec<Stop>,
    /// Entries left out, with the reason
    pub skipped: Vec<DomainError>,
}

/// Join entries to locations by `location_id`.
///
/// Entries referencing a missing location are excluded and reported in
/// [`Joined::skipped`]. Stops come out in route order: by visit date,
/// then creation time, then id.
pub fn join_stops(entries: &[JournalEntryRow], locations: &[LocationRow]) -> Joined {
    let by_id: HashMap<&str, &LocationRow> =
        locations.iter().map(|l| (l.id.as_str(), l)).collect();

    let mut ordered: Vec<&JournalEntryRow> = entries.iter().collect();
    ordered.sort_by(|a, b| {
        a.date()
            .cmp(&b.date())
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut joined = Joined::default();
    for entry in ordered {
        match by_id.get(entry.location_id.as_str()) {
            Some(location) => joined.stops.push(Stop {
                id: StopId::new(&entry.id),
                date: entry.date(),
                location: location.name.clone(),
                point: location.point(),
                description: entry.content.clone(),
            }),
            None => joined.skipped.push(DomainError::DanglingLocation {
                entry: entry.id.clone(),
                location: entry.location_id.clone(),
            }),
        }
    }

    joined
}
