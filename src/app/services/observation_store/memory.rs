//! In-memory store used by unit tests

use super::{BatchOutcome, ObservationStore, StationCatalog};
use crate::app::models::{ImportRun, ObservationKey, ObservationRecord, Station};
use crate::{ImportError, Result};
use std::cell::Cell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub stations: BTreeMap<String, Station>,
    pub observations: BTreeMap<ObservationKey, ObservationRecord>,
    /// Record count of every applied batch, in order
    pub batches: Vec<usize>,
    pub runs: Vec<ImportRun>,
    /// 1-based batch number that fails instead of applying
    pub fail_on_batch: Option<usize>,
    pub name_lookups: Cell<usize>,
    pub finished: bool,
}

impl MemoryStore {
    pub fn with_stations(stations: &[(&str, &str)]) -> Self {
        let mut store = Self::default();
        for (code, name) in stations {
            store.stations.insert(
                code.to_string(),
                Station {
                    code: code.to_string(),
                    name: name.to_string(),
                    latitude: None,
                    longitude: None,
                    region: "Unknown".to_string(),
                },
            );
        }
        store
    }
}

impl StationCatalog for MemoryStore {
    fn station_by_code(&self, code: &str) -> Result<Option<Station>> {
        Ok(self.stations.get(code).cloned())
    }

    fn stations_by_name(&self, name: &str) -> Result<Vec<Station>> {
        self.name_lookups.set(self.name_lookups.get() + 1);
        Ok(self
            .stations
            .values()
            .filter(|station| station.name == name)
            .cloned()
            .collect())
    }

    fn register_station(&mut self, station: &Station) -> Result<()> {
        self.stations
            .entry(station.code.clone())
            .or_insert_with(|| station.clone());
        Ok(())
    }
}

impl ObservationStore for MemoryStore {
    fn apply_batch(&mut self, records: &[ObservationRecord]) -> Result<BatchOutcome> {
        if self.fail_on_batch == Some(self.batches.len() + 1) {
            return Err(ImportError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
                Some("database or disk is full".to_string()),
            )));
        }

        let mut outcome = BatchOutcome::default();
        for record in records {
            match self.observations.get_mut(&record.key) {
                Some(existing) => {
                    existing.fields.extend(record.fields.iter());
                    outcome.updated += 1;
                }
                None => {
                    self.observations.insert(record.key.clone(), record.clone());
                    outcome.created += 1;
                }
            }
        }
        self.batches.push(records.len());
        Ok(outcome)
    }

    fn record_run(&mut self, run: &ImportRun) -> Result<()> {
        self.runs.push(run.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
