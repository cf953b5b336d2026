//! Test utilities for CLIDATA parser testing

use csv::StringRecord;
use std::io::Write;
use tempfile::NamedTempFile;

mod record_parser_tests;

/// Header in the column order GMet exports use
pub fn clidata_header() -> String {
    let days: Vec<String> = (1..=31).map(|day| day.to_string()).collect();
    format!(
        "Station ID,Lon,Lat,Name,Element ID,Year,Month,Time,Data Type,{}",
        days.join(",")
    )
}

/// One data line with the given day values; later days are left empty
pub fn clidata_line(station: &str, element: &str, year: i32, month: u32, days: &[&str]) -> String {
    let mut cells: Vec<String> = days.iter().map(|d| d.to_string()).collect();
    cells.resize(31, String::new());
    format!(
        "{},-0.17,5.6,Kotoka Intl,{},{},{},06:00,Daily,{}",
        station,
        element,
        year,
        month,
        cells.join(",")
    )
}

/// A small but realistic CLIDATA export
pub fn create_test_clidata_csv() -> String {
    [
        clidata_header(),
        clidata_line("23016ACC", "RR", 2024, 1, &["0", "", "5", "12.5"]),
        clidata_line("23016ACC", "KTS", 2024, 1, &["10", "-999", "4"]),
        clidata_line("23016ACC", "SUNHR", 2024, 1, &["8.1", "7.9"]),
        clidata_line("07006TAM", "TX", 2024, 2, &["33.1", "34.0"]),
    ]
    .join("\n")
}

pub fn record(fields: &[&str]) -> StringRecord {
    StringRecord::from(fields.to_vec())
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "{}", content).unwrap();
    temp_file
}
