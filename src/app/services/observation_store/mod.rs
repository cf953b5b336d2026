//! Persistence for stations and synoptic observations
//!
//! The import pipeline only talks to storage through the [`StationCatalog`]
//! and [`ObservationStore`] traits. [`SqliteStore`] is the production
//! implementation; tests use an in-memory store.

use crate::Result;
use crate::app::models::{ImportRun, ObservationRecord, Station};
use serde::Serialize;

pub mod sqlite;

#[cfg(test)]
pub mod memory;

#[cfg(test)]
pub mod tests;

pub use sqlite::SqliteStore;

/// Lookup and registration of persisted stations
pub trait StationCatalog {
    /// Station with the given internal code
    fn station_by_code(&self, code: &str) -> Result<Option<Station>>;

    /// Every station whose name equals `name` exactly
    fn stations_by_name(&self, name: &str) -> Result<Vec<Station>>;

    /// Add a station; an existing station with the same code is left as is
    fn register_station(&mut self, station: &Station) -> Result<()>;
}

/// Counts from applying one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub created: usize,
    pub updated: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

impl std::ops::AddAssign for BatchOutcome {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.updated += other.updated;
    }
}

/// Create-or-update storage for observation records
pub trait ObservationStore {
    /// Apply a batch atomically.
    ///
    /// For each record: when a row with the same key exists, only the fields
    /// present in the record are overwritten; otherwise a new row is created.
    /// Either every record in the batch is applied or none is.
    fn apply_batch(&mut self, records: &[ObservationRecord]) -> Result<BatchOutcome>;

    /// Record the outcome of a run
    fn record_run(&mut self, _run: &ImportRun) -> Result<()> {
        Ok(())
    }

    /// Release the store at the end of a run
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
