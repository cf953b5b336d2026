//! Import statistics and run outcome

use crate::ImportError;
use crate::app::services::observation_store::BatchOutcome;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Counters gathered over one import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportStatistics {
    /// Source file the statistics describe
    pub source: String,
    pub dry_run: bool,

    /// Data records read, including ones that were skipped
    pub rows_processed: usize,
    /// Rows outside the requested year range
    pub rows_filtered: usize,
    pub observations_created: usize,
    pub observations_updated: usize,
    /// Row- and cell-level problems that were skipped
    pub errors: usize,

    pub tuples_emitted: usize,
    pub missing_cells: usize,
    pub invalid_dates: usize,
    pub invalid_values: usize,
    /// CSV records that could not be read or parsed
    pub malformed_rows: usize,
    pub unmapped_element_rows: usize,
    pub unmapped_station_rows: usize,
    pub stations_registered: usize,
    pub batches_committed: usize,

    pub stations_seen: BTreeSet<String>,
    pub elements_seen: BTreeSet<String>,
    /// Unmapped element code to row count
    pub unmapped_elements: BTreeMap<String, usize>,
    /// "id (name)" to row count
    pub unmapped_stations: BTreeMap<String, usize>,

    pub elapsed_seconds: f64,
}

impl ImportStatistics {
    pub fn new(source: impl Into<String>, dry_run: bool) -> Self {
        Self {
            source: source.into(),
            dry_run,
            ..Self::default()
        }
    }

    /// Note the station and element of a parsed row
    pub fn observe_row(&mut self, station_id: &str, element: &str) {
        if !self.stations_seen.contains(station_id) {
            self.stations_seen.insert(station_id.to_string());
        }
        if !self.elements_seen.contains(element) {
            self.elements_seen.insert(element.to_string());
        }
    }

    /// Count a malformed or unparseable row
    pub fn record_malformed_row(&mut self) {
        self.malformed_rows += 1;
        self.errors += 1;
    }

    /// Count a row with an unmapped element; `true` the first time the code is seen
    pub fn record_unmapped_element(&mut self, code: &str) -> bool {
        self.unmapped_element_rows += 1;
        let count = self.unmapped_elements.entry(code.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Count a row whose station is unresolved; `true` the first time the station is seen
    pub fn record_unmapped_station(&mut self, station_id: &str, name: &str) -> bool {
        self.unmapped_station_rows += 1;
        self.errors += 1;
        let label = if name.is_empty() {
            station_id.to_string()
        } else {
            format!("{} ({})", station_id, name)
        };
        let count = self.unmapped_stations.entry(label).or_insert(0);
        *count += 1;
        *count == 1
    }

    pub fn record_invalid_value(&mut self) {
        self.invalid_values += 1;
        self.errors += 1;
    }

    pub fn record_batch(&mut self, outcome: BatchOutcome) {
        self.observations_created += outcome.created;
        self.observations_updated += outcome.updated;
        self.batches_committed += 1;
    }

    pub fn distinct_stations(&self) -> usize {
        self.stations_seen.len()
    }

    pub fn distinct_elements(&self) -> usize {
        self.elements_seen.len()
    }

    /// Records created or updated
    pub fn observations_written(&self) -> usize {
        self.observations_created + self.observations_updated
    }

    /// Rows that yielded at least a mapped station and element
    pub fn rows_imported(&self) -> usize {
        self.rows_processed.saturating_sub(
            self.rows_filtered
                + self.malformed_rows
                + self.unmapped_element_rows
                + self.unmapped_station_rows,
        )
    }

    /// Percentage of processed rows that were imported
    pub fn success_rate(&self) -> f64 {
        if self.rows_processed == 0 {
            100.0
        } else {
            (self.rows_imported() as f64 / self.rows_processed as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Import Summary: {} rows -> {} created, {} updated | \
             {} stations, {} elements | Errors: {}{}",
            self.rows_processed,
            self.observations_created,
            self.observations_updated,
            self.distinct_stations(),
            self.distinct_elements(),
            self.errors,
            if self.dry_run { " (dry run)" } else { "" }
        )
    }
}

/// Statistics plus the fatal error, if any, that stopped the run
#[derive(Debug)]
pub struct ImportOutcome {
    pub stats: ImportStatistics,
    pub failure: Option<ImportError>,
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}
