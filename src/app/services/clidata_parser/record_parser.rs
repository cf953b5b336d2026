//! Conversion of a single CSV record into a [`ClidataRow`]

use super::column_mapping::ColumnMapping;
use super::field_parsers::{
    get_field, get_required_field, parse_month, parse_optional_f64, parse_time_of_day,
    parse_year,
};
use crate::app::models::ClidataRow;
use crate::constants::DAYS_PER_ROW;
use csv::StringRecord;
use thiserror::Error;

/// Why a record could not be turned into a row.
///
/// These never stop an import; the row is skipped and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing value for '{column}'")]
    MissingField { column: &'static str },

    #[error("'{value}' is not a whole number for '{column}'")]
    InvalidInteger { column: &'static str, value: String },

    #[error("'{value}' is out of range for '{column}'")]
    OutOfRange { column: &'static str, value: String },

    #[error("'{value}' is not a time of day")]
    InvalidTime { value: String },
}

/// Parse one CLIDATA record.
///
/// Day cells are kept as raw text; deciding whether a cell is missing or
/// invalid happens during expansion, where the full row context is known.
pub fn parse_clidata_row<'a>(
    record: &'a StringRecord,
    mapping: &ColumnMapping,
) -> Result<ClidataRow<'a>, RowError> {
    let station_id = get_required_field(record, mapping.station_id, "Station ID")?;
    let element = get_required_field(record, mapping.element, "Element ID")?;
    let year = parse_year(get_required_field(record, mapping.year, "Year")?)?;
    let month = parse_month(get_required_field(record, mapping.month, "Month")?)?;

    let time = get_field(record, mapping.time)
        .map(parse_time_of_day)
        .transpose()?;

    let mut days = [None; DAYS_PER_ROW];
    for (slot, index) in days.iter_mut().zip(mapping.days.iter()) {
        *slot = index.and_then(|index| record.get(index));
    }

    Ok(ClidataRow {
        line: record.position().map(|position| position.line()).unwrap_or(0),
        station_id,
        element,
        year,
        month,
        time,
        data_type: get_field(record, mapping.data_type),
        days,
        latitude: parse_optional_f64(record, mapping.latitude),
        longitude: parse_optional_f64(record, mapping.longitude),
        name: get_field(record, mapping.name),
    })
}
