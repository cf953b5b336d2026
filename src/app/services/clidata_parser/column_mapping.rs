//! Column mapping for CLIDATA headers
//!
//! Columns are located by name rather than position, so exports with
//! reordered or extra columns still parse.

use crate::constants::{DAYS_PER_ROW, columns};
use crate::error::{ImportError, Result};
use csv::StringRecord;
use std::path::Path;

/// Column positions resolved from a CLIDATA header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub station_id: usize,
    pub element: usize,
    pub year: usize,
    pub month: usize,
    pub time: Option<usize>,
    pub data_type: Option<usize>,
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
    pub name: Option<usize>,

    /// Column index for each day, `days[0]` being day 1
    pub days: [Option<usize>; DAYS_PER_ROW],

    /// Headers that matched nothing
    pub unrecognized: Vec<String>,
}

impl ColumnMapping {
    /// Analyze a header record.
    ///
    /// Fails when station id, element, year or month cannot be found; every
    /// other column is optional. When a header matches more than one alias
    /// group, the first occurrence wins.
    pub fn analyze(headers: &StringRecord, source: &Path) -> Result<Self> {
        let mut station_id = None;
        let mut element = None;
        let mut year = None;
        let mut month = None;
        let mut time = None;
        let mut data_type = None;
        let mut latitude = None;
        let mut longitude = None;
        let mut name = None;
        let mut days = [None; DAYS_PER_ROW];
        let mut unrecognized = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            let normalized = normalize_header(header);

            let slot = if columns::STATION_ID.contains(&normalized.as_str()) {
                &mut station_id
            } else if columns::ELEMENT.contains(&normalized.as_str()) {
                &mut element
            } else if columns::YEAR.contains(&normalized.as_str()) {
                &mut year
            } else if columns::MONTH.contains(&normalized.as_str()) {
                &mut month
            } else if columns::TIME.contains(&normalized.as_str()) {
                &mut time
            } else if columns::DATA_TYPE.contains(&normalized.as_str()) {
                &mut data_type
            } else if columns::LATITUDE.contains(&normalized.as_str()) {
                &mut latitude
            } else if columns::LONGITUDE.contains(&normalized.as_str()) {
                &mut longitude
            } else if columns::NAME.contains(&normalized.as_str()) {
                &mut name
            } else if let Some(day) = day_number(&normalized) {
                &mut days[day - 1]
            } else {
                unrecognized.push(header.trim().to_string());
                continue;
            };

            if slot.is_none() {
                *slot = Some(index);
            }
        }

        let required = |slot: Option<usize>, column: &str| {
            slot.ok_or_else(|| ImportError::MissingColumn {
                path: source.to_path_buf(),
                column: column.to_string(),
            })
        };

        Ok(ColumnMapping {
            station_id: required(station_id, "Station ID")?,
            element: required(element, "Element ID")?,
            year: required(year, "Year")?,
            month: required(month, "Month")?,
            time,
            data_type,
            latitude,
            longitude,
            name,
            days,
            unrecognized,
        })
    }

    /// Number of day columns present in the header
    pub fn day_column_count(&self) -> usize {
        self.days.iter().filter(|day| day.is_some()).count()
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Lower-case, trim, drop a UTF-8 BOM and fold `_`/`-` into single spaces
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Day number for headers such as `1`, `01`, `day 1` or `Day1`
fn day_number(normalized: &str) -> Option<usize> {
    let digits = normalized
        .strip_prefix("day")
        .map(str::trim_start)
        .unwrap_or(normalized);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits
        .parse::<usize>()
        .ok()
        .filter(|day| (1..=DAYS_PER_ROW).contains(day))
}
