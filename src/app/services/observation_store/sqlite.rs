//! SQLite implementation of the station catalog and observation store

use super::{BatchOutcome, ObservationStore, StationCatalog};
use crate::Result;
use crate::app::models::{
    ImportRun, ObservationField, ObservationKey, ObservationRecord, Station,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Distinct UPDATE/INSERT shapes are cached per field combination
const STATEMENT_CACHE_CAPACITY: usize = 64;

/// Observation store backed by an SQLite database.
///
/// In dry-run mode everything happens inside one outer transaction that
/// [`ObservationStore::finish`] rolls back; batches become savepoints within
/// it, so no change is ever visible to other connections.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    dry_run: bool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path, dry_run: bool) -> Result<Self> {
        debug!("Opening database {}", path.display());
        Self::initialize(Connection::open(path)?, dry_run)
    }

    pub fn open_in_memory(dry_run: bool) -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?, dry_run)
    }

    fn initialize(conn: Connection, dry_run: bool) -> Result<Self> {
        // Has no effect once a transaction is open
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);

        if dry_run {
            conn.execute_batch("BEGIN")?;
        }
        conn.execute_batch(include_str!("create_schema.sql"))?;

        Ok(Self { conn, dry_run })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Stored record for a key, holding only the non-null fields
    pub fn fetch_observation(&self, key: &ObservationKey) -> Result<Option<ObservationRecord>> {
        let columns: Vec<&str> = ObservationField::ALL
            .iter()
            .map(|field| field.column_name())
            .collect();
        let sql = format!(
            "SELECT {} FROM synoptic_observations WHERE station_code = ?1 AND obs_datetime = ?2",
            columns.join(", ")
        );

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let record = stmt
            .query_row(
                params![key.station_code, format_timestamp(&key.timestamp)],
                |row| {
                    let mut record = ObservationRecord::new(key.clone());
                    for (index, field) in ObservationField::ALL.iter().enumerate() {
                        if let Some(value) = row.get::<_, Option<f64>>(index)? {
                            record.set(*field, value);
                        }
                    }
                    Ok(record)
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn observation_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM synoptic_observations", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }

    pub fn import_run_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM import_runs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn existing_observation_id(conn: &Connection, record: &ObservationRecord) -> Result<Option<i64>> {
        let mut stmt = conn.prepare_cached(
            "SELECT id FROM synoptic_observations WHERE station_code = ?1 AND obs_datetime = ?2",
        )?;
        let id = stmt
            .query_row(
                params![
                    record.key.station_code,
                    format_timestamp(&record.key.timestamp)
                ],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn update_observation(conn: &Connection, id: i64, record: &ObservationRecord) -> Result<()> {
        let assignments: Vec<String> = record
            .fields
            .keys()
            .enumerate()
            .map(|(index, field)| format!("{} = ?{}", field.column_name(), index + 1))
            .collect();
        let sql = format!(
            "UPDATE synoptic_observations SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ?{}",
            assignments.join(", "),
            record.field_count() + 1
        );

        let values = record
            .fields
            .values()
            .map(|value| Value::Real(*value))
            .chain(std::iter::once(Value::Integer(id)));

        conn.prepare_cached(&sql)?.execute(params_from_iter(values))?;
        Ok(())
    }

    fn insert_observation(conn: &Connection, record: &ObservationRecord) -> Result<()> {
        let columns: Vec<&str> = record.fields.keys().map(|field| field.column_name()).collect();
        let placeholders: Vec<String> = (0..record.field_count())
            .map(|index| format!("?{}", index + 3))
            .collect();
        let sql = format!(
            "INSERT INTO synoptic_observations (station_code, obs_datetime, {}) VALUES (?1, ?2, {})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let values = [
            Value::Text(record.key.station_code.clone()),
            Value::Text(format_timestamp(&record.key.timestamp)),
        ]
        .into_iter()
        .chain(record.fields.values().map(|value| Value::Real(*value)));

        conn.prepare_cached(&sql)?.execute(params_from_iter(values))?;
        Ok(())
    }
}

impl StationCatalog for SqliteStore {
    fn station_by_code(&self, code: &str) -> Result<Option<Station>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT code, name, latitude, longitude, region FROM stations WHERE code = ?1",
        )?;
        Ok(stmt.query_row(params![code], station_from_row).optional()?)
    }

    fn stations_by_name(&self, name: &str) -> Result<Vec<Station>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT code, name, latitude, longitude, region FROM stations WHERE name = ?1 ORDER BY code",
        )?;
        let stations = stmt
            .query_map(params![name], station_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stations)
    }

    fn register_station(&mut self, station: &Station) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO stations (code, name, latitude, longitude, region)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(code) DO NOTHING",
        )?;
        stmt.execute(params![
            station.code,
            station.name,
            station.latitude,
            station.longitude,
            station.region
        ])?;
        Ok(())
    }
}

impl ObservationStore for SqliteStore {
    fn apply_batch(&mut self, records: &[ObservationRecord]) -> Result<BatchOutcome> {
        let savepoint = self.conn.savepoint()?;
        let mut outcome = BatchOutcome::default();

        for record in records.iter().filter(|record| !record.is_empty()) {
            match Self::existing_observation_id(&savepoint, record)? {
                Some(id) => {
                    Self::update_observation(&savepoint, id, record)?;
                    outcome.updated += 1;
                }
                None => {
                    Self::insert_observation(&savepoint, record)?;
                    outcome.created += 1;
                }
            }
        }

        savepoint.commit()?;
        Ok(outcome)
    }

    fn record_run(&mut self, run: &ImportRun) -> Result<()> {
        self.conn.execute(
            "INSERT INTO import_runs (source_file, started_at, finished_at, status, rows_processed,
                                      observations_created, observations_updated, errors, error_message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                run.source_file,
                format_timestamp(&run.started_at),
                format_timestamp(&run.finished_at),
                run.status.to_string(),
                run.rows_processed as i64,
                run.observations_created as i64,
                run.observations_updated as i64,
                run.errors as i64,
                run.error_message
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.dry_run && !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
            info!("Dry run: all changes rolled back");
        }
        Ok(())
    }
}

fn station_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Station> {
    Ok(Station {
        code: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        region: row.get(4)?,
    })
}

/// Stored timestamp text: RFC 3339 in UTC, whole seconds, `Z` suffix
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
