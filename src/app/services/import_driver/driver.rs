//! Import driver: streams a CLIDATA file through mapping, expansion and
//! batched upserts

use super::progress::ImportProgress;
use super::stats::{ImportOutcome, ImportStatistics};
use crate::Result;
use crate::app::models::{ImportRun, RunStatus};
use crate::app::services::clidata_parser::{ClidataReader, ColumnMapping, parse_clidata_row};
use crate::app::services::element_mapper::{ElementMapper, normalize_code};
use crate::app::services::observation_store::{ObservationStore, StationCatalog};
use crate::app::services::row_expander::{DayCell, RowExpander};
use crate::app::services::station_mapper::{StationMapper, StationResolution};
use crate::app::services::upsert_coordinator::UpsertCoordinator;
use crate::config::ImportConfig;
use chrono::Utc;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-run pipeline state
struct Pipeline {
    elements: ElementMapper,
    stations: StationMapper,
    expander: RowExpander,
    coordinator: UpsertCoordinator,
}

impl Pipeline {
    fn new(config: &ImportConfig) -> Result<Self> {
        Ok(Self {
            elements: ElementMapper::new(&config.mappings),
            stations: StationMapper::new(&config.mappings, config.register_unknown_stations),
            expander: RowExpander::new(config)?,
            coordinator: UpsertCoordinator::new(config.batch_size),
        })
    }
}

/// Runs imports against a store
#[derive(Debug)]
pub struct ImportDriver<S> {
    config: ImportConfig,
    store: S,
    show_progress: bool,
}

impl<S> ImportDriver<S>
where
    S: ObservationStore + StationCatalog,
{
    pub fn new(config: ImportConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            show_progress: false,
        })
    }

    /// Show a byte-based progress bar while importing
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Import a CLIDATA file.
    ///
    /// Errors returned here happen before any row is read (missing file,
    /// missing header column). A failure part-way through is reported in
    /// [`ImportOutcome::failure`] next to the statistics gathered so far.
    pub fn run(&mut self, path: &Path) -> Result<ImportOutcome> {
        let reader = ClidataReader::open(path)?;
        Ok(self.run_reader(reader))
    }

    /// Import from an already opened reader
    pub fn run_reader<R: Read>(&mut self, mut reader: ClidataReader<R>) -> ImportOutcome {
        let started_at = Utc::now();
        let timer = Instant::now();
        let source = reader.source().display().to_string();
        let mut stats = ImportStatistics::new(source.clone(), self.config.dry_run);
        let progress = ImportProgress::new(reader.total_bytes(), self.show_progress);

        info!(
            "Importing {} with batch size {}{}",
            source,
            self.config.batch_size,
            if self.config.dry_run { " (dry run)" } else { "" }
        );

        let mut failure = self.import_rows(&mut reader, &mut stats, &progress).err();
        stats.elapsed_seconds = timer.elapsed().as_secs_f64();

        match &failure {
            Some(error) => progress.finish_with_error(&error.to_string()),
            None => progress.finish(&stats),
        }

        if !self.config.dry_run {
            let run = ImportRun {
                source_file: source,
                started_at,
                finished_at: Utc::now(),
                status: if failure.is_some() {
                    RunStatus::Failed
                } else {
                    RunStatus::Completed
                },
                rows_processed: stats.rows_processed,
                observations_created: stats.observations_created,
                observations_updated: stats.observations_updated,
                errors: stats.errors,
                error_message: failure.as_ref().map(|error| error.to_string()),
            };
            if let Err(error) = self.store.record_run(&run) {
                warn!("Could not record import run: {}", error);
            }
        }

        if let Err(error) = self.store.finish() {
            if failure.is_none() {
                failure = Some(error);
            } else {
                warn!("Could not close the store cleanly: {}", error);
            }
        }

        info!("{}", stats.summary());
        ImportOutcome { stats, failure }
    }

    fn import_rows<R: Read>(
        &mut self,
        reader: &mut ClidataReader<R>,
        stats: &mut ImportStatistics,
        progress: &ImportProgress,
    ) -> Result<()> {
        let mut pipeline = Pipeline::new(&self.config)?;
        let result = self.stream_rows(reader, &mut pipeline, stats, progress);
        stats.stations_registered = pipeline.stations.registered_count();
        result?;

        if let Some(outcome) = pipeline.coordinator.finish(&mut self.store)? {
            stats.record_batch(outcome);
        }
        Ok(())
    }

    fn stream_rows<R: Read>(
        &mut self,
        reader: &mut ClidataReader<R>,
        pipeline: &mut Pipeline,
        stats: &mut ImportStatistics,
        progress: &ImportProgress,
    ) -> Result<()> {
        let mut record = StringRecord::new();

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    stats.rows_processed += 1;
                    self.process_record(&record, reader.mapping(), pipeline, stats, progress)?;
                }
                Err(error) if error.is_io_error() => return Err(error.into()),
                Err(error) => {
                    stats.rows_processed += 1;
                    stats.record_malformed_row();
                    progress.suspend(|| warn!("Skipping malformed record: {}", error));
                }
            }

            if let Some(outcome) = pipeline.coordinator.row_completed(&mut self.store)? {
                stats.record_batch(outcome);
            }
            progress.update(reader.bytes_read(), stats);
        }

        Ok(())
    }

    /// Handle one record. Only store failures are returned as errors.
    fn process_record(
        &mut self,
        record: &StringRecord,
        mapping: &ColumnMapping,
        pipeline: &mut Pipeline,
        stats: &mut ImportStatistics,
        progress: &ImportProgress,
    ) -> Result<()> {
        let row = match parse_clidata_row(record, mapping) {
            Ok(row) => row,
            Err(error) => {
                stats.record_malformed_row();
                let line = record.position().map(|position| position.line()).unwrap_or(0);
                progress.suspend(|| warn!("Line {}: skipping row: {}", line, error));
                return Ok(());
            }
        };

        let element = normalize_code(row.element);
        stats.observe_row(row.station_id.trim(), &element);

        if !self.config.year_range.contains(row.year) {
            stats.rows_filtered += 1;
            return Ok(());
        }

        let Some(rule) = pipeline.elements.resolve(&element) else {
            if stats.record_unmapped_element(&element) {
                progress.suspend(|| {
                    warn!(
                        "Unmapped element '{}' skipped (line {}); further rows with it are counted silently",
                        element, row.line
                    )
                });
            } else {
                debug!("Unmapped element '{}' skipped (line {})", element, row.line);
            }
            return Ok(());
        };

        let resolution = pipeline.stations.resolve(&row, &mut self.store)?;
        let station_code = match &resolution {
            StationResolution::Unresolved(reason) => {
                let name = row.display_name().trim();
                if stats.record_unmapped_station(row.station_id.trim(), name) {
                    progress.suspend(|| {
                        warn!(
                            "Unmapped station id '{}' name '{}': {} (line {})",
                            row.station_id.trim(),
                            name,
                            reason,
                            row.line
                        )
                    });
                } else {
                    debug!(
                        "Unmapped station id '{}' name '{}' (line {})",
                        row.station_id.trim(),
                        name,
                        row.line
                    );
                }
                return Ok(());
            }
            resolved => resolved.code().unwrap_or_default(),
        };

        for cell in pipeline.expander.expand(&row, station_code, rule) {
            match cell {
                DayCell::Observation(tuple) => {
                    stats.tuples_emitted += 1;
                    pipeline.coordinator.accept(tuple);
                }
                DayCell::Missing { .. } => stats.missing_cells += 1,
                DayCell::InvalidDate { day } => {
                    stats.invalid_dates += 1;
                    debug!(
                        "Skipping day {} of {}-{:02}: not a calendar date",
                        day, row.year, row.month
                    );
                }
                DayCell::InvalidValue { day, raw } => {
                    stats.record_invalid_value();
                    progress.suspend(|| {
                        warn!(
                            "Invalid value '{}' for station {} element {} on {}-{:02}-{:02} (line {})",
                            raw,
                            row.station_id.trim(),
                            element,
                            row.year,
                            row.month,
                            day,
                            row.line
                        )
                    });
                }
            }
        }

        Ok(())
    }
}
