//! Tests for record and field parsing

use super::*;
use crate::app::services::clidata_parser::field_parsers::{
    parse_integer, parse_month, parse_time_of_day, parse_year,
};
use crate::app::services::clidata_parser::{ColumnMapping, RowError, parse_clidata_row};
use chrono::NaiveTime;
use std::path::Path;

fn standard_mapping() -> ColumnMapping {
    let headers = StringRecord::from(clidata_header().split(',').collect::<Vec<_>>());
    ColumnMapping::analyze(&headers, Path::new("test.csv")).unwrap()
}

fn line_record(line: &str) -> StringRecord {
    StringRecord::from(line.split(',').collect::<Vec<_>>())
}

#[test]
fn test_parse_complete_row() {
    let mapping = standard_mapping();
    let record = line_record(&clidata_line("23016ACC", "RR", 2024, 1, &["0", "", "5", "12.5"]));
    let row = parse_clidata_row(&record, &mapping).unwrap();

    assert_eq!(row.station_id, "23016ACC");
    assert_eq!(row.element, "RR");
    assert_eq!(row.year, 2024);
    assert_eq!(row.month, 1);
    assert_eq!(row.time, NaiveTime::from_hms_opt(6, 0, 0));
    assert_eq!(row.data_type, Some("Daily"));
    assert_eq!(row.name, Some("Kotoka Intl"));
    assert_eq!(row.latitude, Some(5.6));
    assert_eq!(row.longitude, Some(-0.17));
    assert_eq!(row.day_value(1), Some("0"));
    assert_eq!(row.day_value(2), Some(""));
    assert_eq!(row.day_value(4), Some("12.5"));
    assert_eq!(row.day_value(5), Some(""));
}

#[test]
fn test_short_record_leaves_days_absent() {
    let mapping = standard_mapping();
    let record = record(&[
        "23016ACC", "", "", "", "RR", "2024", "1", "", "", "3.2",
    ]);
    let row = parse_clidata_row(&record, &mapping).unwrap();

    assert_eq!(row.time, None);
    assert_eq!(row.name, None);
    assert!(!row.has_coordinates());
    assert_eq!(row.day_value(1), Some("3.2"));
    assert_eq!(row.day_value(2), None);
}

#[test]
fn test_missing_station_id() {
    let mapping = standard_mapping();
    let record = line_record(&clidata_line(" ", "RR", 2024, 1, &["1"]));
    assert_eq!(
        parse_clidata_row(&record, &mapping).unwrap_err(),
        RowError::MissingField {
            column: "Station ID"
        }
    );
}

#[test]
fn test_invalid_month() {
    let mapping = standard_mapping();
    let record = line_record(&clidata_line("23016ACC", "RR", 2024, 13, &["1"]));
    assert!(matches!(
        parse_clidata_row(&record, &mapping),
        Err(RowError::OutOfRange {
            column: "Month",
            ..
        })
    ));
}

#[test]
fn test_integer_fields_accept_whole_floats() {
    assert_eq!(parse_integer("2024", "Year"), Ok(2024));
    assert_eq!(parse_integer("2024.0", "Year"), Ok(2024));
    assert!(parse_integer("2024.5", "Year").is_err());
    assert!(parse_integer("abc", "Year").is_err());
    assert_eq!(parse_year("1961"), Ok(1961));
    assert!(parse_year("0").is_err());
    assert_eq!(parse_month("12"), Ok(12));
    assert!(parse_month("0").is_err());
}

#[test]
fn test_time_formats() {
    let six = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
    assert_eq!(parse_time_of_day("06:00"), Ok(six));
    assert_eq!(parse_time_of_day("6:00"), Ok(six));
    assert_eq!(parse_time_of_day("06:00:00"), Ok(six));
    assert_eq!(parse_time_of_day("0600"), Ok(six));
    assert_eq!(parse_time_of_day("600"), Ok(six));
    assert_eq!(parse_time_of_day("6"), Ok(six));
    assert_eq!(
        parse_time_of_day("1530"),
        Ok(NaiveTime::from_hms_opt(15, 30, 0).unwrap())
    );
    assert!(parse_time_of_day("2460").is_err());
    assert!(parse_time_of_day("25:00").is_err());
    assert!(parse_time_of_day("noon").is_err());
}
