//! Test utilities for import driver testing

use crate::app::services::clidata_parser::ClidataReader;
use crate::app::services::import_driver::{ImportDriver, ImportOutcome};
use crate::app::services::observation_store::memory::MemoryStore;
use crate::config::ImportConfig;


pub fn header() -> String {
    let days: Vec<String> = (1..=31).map(|day| day.to_string()).collect();
    format!("Station ID,Name,Element ID,Year,Month,Time,{}", days.join(","))
}

pub fn line(station: &str, name: &str, element: &str, year: i32, month: u32, days: &[&str]) -> String {
    let mut cells: Vec<String> = days.iter().map(|d| d.to_string()).collect();
    cells.resize(31, String::new());
    format!(
        "{},{},{},{},{},06:00,{}",
        station,
        name,
        element,
        year,
        month,
        cells.join(",")
    )
}

pub fn csv(lines: &[String]) -> String {
    let mut content = header();
    for line in lines {
        content.push('\n');
        content.push_str(line);
    }
    content.push('\n');
    content
}

/// Catalog with Kotoka (mapped by id) and Tamale (found by name)
pub fn catalog() -> MemoryStore {
    MemoryStore::with_stations(&[("DGAA", "Kotoka Intl"), ("DGLE", "Tamale")])
}

/// Built-in tables already map 23016ACC to DGAA
pub fn config() -> ImportConfig {
    ImportConfig::default()
}

/// Run an import of `content` and hand back the outcome and the store
pub fn import(config: ImportConfig, store: MemoryStore, content: &str) -> (ImportOutcome, MemoryStore) {
    let mut driver = ImportDriver::new(config, store).unwrap();
    let reader = ClidataReader::from_reader(content.as_bytes(), "test.csv").unwrap();
    let outcome = driver.run_reader(reader);
    (outcome, driver.into_store())
}
