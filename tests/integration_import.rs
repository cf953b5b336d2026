//! End-to-end import tests against a SQLite database on disk
//!
//! Each test writes a small CLIDATA export and a database into a temporary
//! directory, runs the import driver and inspects the database with plain SQL.

use gmet_import::app::models::{ObservationField, ObservationKey, Station};
use gmet_import::app::services::import_driver::{ImportDriver, ImportOutcome};
use gmet_import::app::services::observation_store::{SqliteStore, StationCatalog};
use gmet_import::ImportConfig;
use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CLIDATA: &str = "\
Station ID,Lon,Lat,Name,Element ID,Year,Month,Time,1,2,3,4,5
23016ACC,-0.17,5.6,Kotoka Intl,RR,2024,1,06:00,0,12.5,,3,-999
23016ACC,-0.17,5.6,Kotoka Intl,KTS,2024,1,06:00,10,8,,6,4
23016ACC,-0.17,5.6,Kotoka Intl,TX,2024,1,06:00,33.1,32.8,,31.5,32
07006TAM,-0.85,9.4,Tamale,RH,2024,1,06:00,45,50,48,,47
07006TAM,-0.85,9.4,Tamale,SUNHR,2024,1,06:00,9.1,9.4,8.7,9.9,10
";

struct Fixture {
    _dir: TempDir,
    database: PathBuf,
    source: PathBuf,
}

fn fixture(content: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("gmet_weather.db");
    let source = dir.path().join("clidata.csv");
    std::fs::write(&source, content).unwrap();

    let mut store = SqliteStore::open(&database, false).unwrap();
    for (code, name) in [("DGAA", "Kotoka Intl"), ("DGLE", "Tamale")] {
        store
            .register_station(&Station {
                code: code.to_string(),
                name: name.to_string(),
                latitude: None,
                longitude: None,
                region: "Unknown".to_string(),
            })
            .unwrap();
    }

    Fixture {
        _dir: dir,
        database,
        source,
    }
}

/// Built-in tables map 23016ACC to DGAA; Tamale is found by name
fn config() -> ImportConfig {
    ImportConfig::default()
}

fn import(fixture: &Fixture, config: ImportConfig) -> ImportOutcome {
    let store = SqliteStore::open(&fixture.database, config.dry_run).unwrap();
    let mut driver = ImportDriver::new(config, store).unwrap();
    driver.run(&fixture.source).unwrap()
}

fn count(database: &Path, sql: &str) -> i64 {
    let conn = Connection::open(database).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

fn observation_rows(database: &Path) -> Vec<(String, String, Option<f64>, Option<f64>, Option<f64>)> {
    let conn = Connection::open(database).unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT station_code, obs_datetime, rainfall, wind_speed, relative_humidity
             FROM synoptic_observations ORDER BY station_code, obs_datetime",
        )
        .unwrap();
    stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    })
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

/// Purpose: a full file lands in the database with merged per-day records
#[test]
fn test_import_writes_merged_observations() {
    let fixture = fixture(CLIDATA);
    let outcome = import(&fixture, config());

    assert!(outcome.is_success());
    let stats = &outcome.stats;
    assert_eq!(stats.rows_processed, 5);
    assert_eq!(stats.unmapped_element_rows, 1);
    assert_eq!(stats.unmapped_elements["SUNHR"], 1);
    assert_eq!(stats.errors, 0);

    // DGAA: days 1, 2, 4, 5 (day 3 is empty for every element); DGLE: 1, 2, 3, 5
    assert_eq!(
        count(&fixture.database, "SELECT COUNT(*) FROM synoptic_observations"),
        8
    );
    assert_eq!(stats.observations_created, 8);

    let rows = observation_rows(&fixture.database);
    let day2 = rows
        .iter()
        .find(|row| row.0 == "DGAA" && row.1 == "2024-01-02T06:00:00Z")
        .unwrap();
    assert_eq!(day2.2, Some(12.5));
    assert!((day2.3.unwrap() - 8.0 * 0.514444).abs() < 1e-9);

    // Zero rainfall on day 1 is treated as missing by default
    let day1 = rows
        .iter()
        .find(|row| row.0 == "DGAA" && row.1 == "2024-01-01T06:00:00Z")
        .unwrap();
    assert_eq!(day1.2, None);

    let tamale: Vec<_> = rows.iter().filter(|row| row.0 == "DGLE").collect();
    assert_eq!(tamale.len(), 4);
    assert!(tamale.iter().all(|row| row.4.is_some()));
}

/// Purpose: importing the same file twice leaves the data unchanged
#[test]
fn test_reimport_is_idempotent() {
    let fixture = fixture(CLIDATA);

    let first = import(&fixture, config());
    let after_first = observation_rows(&fixture.database);
    let second = import(&fixture, config());
    let after_second = observation_rows(&fixture.database);

    assert_eq!(after_first, after_second);
    assert_eq!(first.stats.observations_created, 8);
    assert_eq!(second.stats.observations_created, 0);
    assert_eq!(second.stats.observations_updated, 8);
    assert_eq!(
        count(&fixture.database, "SELECT COUNT(*) FROM import_runs"),
        2
    );
    assert_eq!(
        count(
            &fixture.database,
            "SELECT COUNT(*) FROM import_runs WHERE status = 'completed'"
        ),
        2
    );
}

/// Purpose: the batch size only changes how often we commit, not what is stored
#[test]
fn test_batch_size_equivalence() {
    let one_by_one = fixture(CLIDATA);
    let single_batch = fixture(CLIDATA);

    let small = import(&one_by_one, config().with_batch_size(1));
    let large = import(&single_batch, config());

    assert_eq!(small.stats.batches_committed, 5);
    assert_eq!(large.stats.batches_committed, 1);
    assert_eq!(
        observation_rows(&one_by_one.database),
        observation_rows(&single_batch.database)
    );
}

/// Purpose: a dry run reports what it would do and leaves the database alone
#[test]
fn test_dry_run_leaves_database_empty() {
    let fixture = fixture(CLIDATA);
    let outcome = import(&fixture, config().with_dry_run());

    assert!(outcome.is_success());
    assert_eq!(outcome.stats.observations_created, 8);
    assert_eq!(
        count(&fixture.database, "SELECT COUNT(*) FROM synoptic_observations"),
        0
    );
    assert_eq!(
        count(&fixture.database, "SELECT COUNT(*) FROM import_runs"),
        0
    );
}

/// Purpose: stations found by name and stations nobody knows
#[test]
fn test_station_resolution_by_name_and_unknown() {
    let content = "\
Station ID,Name,Element ID,Year,Month,1
07006TAM,Tamale,RR,2024,3,4.2
55555XYZ,Nowhere,RR,2024,3,1.0
";
    let fixture = fixture(content);
    let outcome = import(&fixture, config());

    assert_eq!(outcome.stats.unmapped_station_rows, 1);
    assert!(outcome.stats.unmapped_stations.contains_key("55555XYZ (Nowhere)"));
    assert_eq!(
        count(
            &fixture.database,
            "SELECT COUNT(*) FROM synoptic_observations WHERE station_code = 'DGLE'"
        ),
        1
    );

    // Rows without a time column land at the default observation hour
    let store = SqliteStore::open(&fixture.database, false).unwrap();
    let key = ObservationKey::new("DGLE", Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    let stored = store.fetch_observation(&key).unwrap().unwrap();
    assert_eq!(stored.get(ObservationField::Rainfall), Some(4.2));
}

/// Purpose: with registration enabled unknown stations are created on the fly
#[test]
fn test_register_unknown_stations() {
    let content = "\
Station ID,Lon,Lat,Name,Element ID,Year,Month,1
55555xyz,-2.33,7.33,Sunyani,TN,2024,2,21.5
";
    let fixture = fixture(content);
    let outcome = import(&fixture, config().with_station_registration());

    assert!(outcome.is_success());
    assert_eq!(outcome.stats.stations_registered, 1);

    let store = SqliteStore::open(&fixture.database, false).unwrap();
    let station = store.station_by_code("55555XYZ").unwrap().unwrap();
    assert_eq!(station.name, "Sunyani");
    assert_eq!(station.region, "Bono");
    assert_eq!(station.latitude, Some(7.33));
    assert_eq!(
        count(
            &fixture.database,
            "SELECT COUNT(*) FROM synoptic_observations WHERE min_temperature = 21.5"
        ),
        1
    );
}

/// Purpose: a real GMet export registers a mapped station with its coordinates
#[test]
fn test_gmet_export_registers_mapped_station() {
    let content = "\
Station ID,Element ID,Year,Month,Time,01,02,Geogr1,Geogr2,Name
23024TEM,RH,2024,5,09:00,82,104,5.62,-0.02,Tema
";
    let fixture = fixture(content);
    let outcome = import(&fixture, config().with_station_registration());

    assert!(outcome.is_success());
    assert_eq!(outcome.stats.stations_registered, 1);
    assert_eq!(outcome.stats.invalid_values, 1);

    let store = SqliteStore::open(&fixture.database, false).unwrap();
    assert!(store.station_by_code("23024TEM").unwrap().is_none());
    let station = store.station_by_code("DGTM").unwrap().unwrap();
    assert_eq!(station.name, "Tema");
    assert_eq!(station.region, "Greater Accra");
    assert_eq!(station.latitude, Some(5.62));
    assert_eq!(station.longitude, Some(-0.02));

    let rows = observation_rows(&fixture.database);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "DGTM");
    assert_eq!(rows[0].1, "2024-05-01T09:00:00Z");
    assert_eq!(rows[0].4, Some(82.0));
}

/// Purpose: a header without the required columns is rejected before any row
#[test]
fn test_missing_required_column() {
    let fixture = fixture("Station ID,Element ID,Year,1\n23016ACC,RR,2024,3\n");
    let store = SqliteStore::open(&fixture.database, false).unwrap();
    let mut driver = ImportDriver::new(config(), store).unwrap();

    let error = driver.run(&fixture.source).unwrap_err();
    assert!(error.to_string().contains("Month"));
    assert_eq!(
        count(&fixture.database, "SELECT COUNT(*) FROM import_runs"),
        0
    );
}
