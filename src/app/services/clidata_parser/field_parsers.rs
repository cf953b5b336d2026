//! Field parsing utilities for CLIDATA records

use super::record_parser::RowError;
use chrono::NaiveTime;
use csv::StringRecord;

/// Get a trimmed, non-empty field value
pub fn get_field(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|index| record.get(index))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Get a field value that must be present and non-empty
pub fn get_required_field<'a>(
    record: &'a StringRecord,
    index: usize,
    column: &'static str,
) -> Result<&'a str, RowError> {
    get_field(record, Some(index)).ok_or(RowError::MissingField { column })
}

/// Parse an integer field.
///
/// Spreadsheet exports sometimes write whole numbers as `2024.0`, so a float
/// with no fractional part is accepted too.
pub fn parse_integer(value: &str, column: &'static str) -> Result<i64, RowError> {
    if let Ok(parsed) = value.parse::<i64>() {
        return Ok(parsed);
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.fract() == 0.0 => Ok(parsed as i64),
        _ => Err(RowError::InvalidInteger {
            column,
            value: value.to_string(),
        }),
    }
}

/// Parse the year column
pub fn parse_year(value: &str) -> Result<i32, RowError> {
    let year = parse_integer(value, "Year")?;
    i32::try_from(year)
        .ok()
        .filter(|year| (1..=9999).contains(year))
        .ok_or_else(|| RowError::OutOfRange {
            column: "Year",
            value: value.to_string(),
        })
}

/// Parse the month column (1..=12)
pub fn parse_month(value: &str) -> Result<u32, RowError> {
    let month = parse_integer(value, "Month")?;
    u32::try_from(month)
        .ok()
        .filter(|month| (1..=12).contains(month))
        .ok_or_else(|| RowError::OutOfRange {
            column: "Month",
            value: value.to_string(),
        })
}

/// Parse a time of day: `HH:MM`, `HH:MM:SS`, `HHMM`, `HMM` or a bare hour
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, RowError> {
    let invalid = || RowError::InvalidTime {
        value: value.to_string(),
    };

    if value.contains(':') {
        return NaiveTime::parse_from_str(value, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
            .map_err(|_| invalid());
    }

    if value.is_empty() || value.len() > 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let number: u32 = value.parse().map_err(|_| invalid())?;
    let (hour, minute) = if value.len() <= 2 {
        (number, 0)
    } else {
        (number / 100, number % 100)
    };
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parse an optional coordinate; unparseable text reads as absent
pub fn parse_optional_f64(record: &StringRecord, index: Option<usize>) -> Option<f64> {
    get_field(record, index)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
