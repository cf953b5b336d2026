//! Structural audit of a CLIDATA file
//!
//! Reads a file the same way an import does but never touches a store, and
//! reports what an import would run into: unknown elements, rows that do not
//! parse, stations without coordinates and ids that appear under more than
//! one name.

use crate::Result;
use crate::app::services::clidata_parser::{ClidataReader, parse_clidata_row};
use crate::app::services::element_mapper::{ElementMapper, normalize_code};
use crate::config::MappingConfig;
use csv::StringRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub source: String,
    pub rows: usize,
    /// Records the CSV reader rejected
    pub malformed_rows: usize,
    /// Records with a bad or missing station, element, year, month or time
    pub unparseable_rows: usize,
    pub rows_missing_coordinates: usize,
    pub day_columns: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Station id to the names it appears with
    pub stations: BTreeMap<String, BTreeSet<String>>,
    /// Element code to row count
    pub elements: BTreeMap<String, usize>,
    pub unknown_elements: BTreeSet<String>,
}

impl AuditReport {
    pub fn distinct_stations(&self) -> usize {
        self.stations.len()
    }

    /// Station ids that appear with more than one name
    pub fn conflicting_station_names(&self) -> Vec<&str> {
        self.stations
            .iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn has_problems(&self) -> bool {
        self.malformed_rows > 0
            || self.unparseable_rows > 0
            || !self.unknown_elements.is_empty()
            || !self.conflicting_station_names().is_empty()
    }

    fn record_year(&mut self, year: i32) {
        self.first_year = Some(self.first_year.map_or(year, |first| first.min(year)));
        self.last_year = Some(self.last_year.map_or(year, |last| last.max(year)));
    }
}

/// Audit a CLIDATA file against the given element table
pub fn audit_file(path: &Path, mappings: &MappingConfig) -> Result<AuditReport> {
    let reader = ClidataReader::open(path)?;
    audit_reader(reader, mappings)
}

pub fn audit_reader<R: Read>(mut reader: ClidataReader<R>, mappings: &MappingConfig) -> Result<AuditReport> {
    let elements = ElementMapper::new(mappings);
    let mut report = AuditReport {
        source: reader.source().display().to_string(),
        day_columns: reader.mapping().day_column_count(),
        ..AuditReport::default()
    };
    let mut record = StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                report.rows += 1;
                report.malformed_rows += 1;
                debug!("Malformed record: {}", error);
                continue;
            }
        }
        report.rows += 1;

        let row = match parse_clidata_row(&record, reader.mapping()) {
            Ok(row) => row,
            Err(error) => {
                report.unparseable_rows += 1;
                debug!("Unparseable row: {}", error);
                continue;
            }
        };

        let code = normalize_code(row.element);
        if !elements.is_known(&code) {
            report.unknown_elements.insert(code.clone());
        }
        *report.elements.entry(code).or_insert(0) += 1;

        let names = report
            .stations
            .entry(row.station_id.trim().to_string())
            .or_default();
        if let Some(name) = row.name {
            if !names.contains(name) {
                names.insert(name.to_string());
            }
        }

        if !row.has_coordinates() {
            report.rows_missing_coordinates += 1;
        }
        report.record_year(row.year);
    }

    info!(
        "Audited {}: {} rows, {} stations, {} elements",
        report.source,
        report.rows,
        report.distinct_stations(),
        report.elements.len()
    );
    Ok(report)
}
