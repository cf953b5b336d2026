//! Data models for CLIDATA import
//!
//! This module contains the core data structures shared by the import
//! pipeline: target observation fields, unit conversions, observation keys
//! and records, station catalog entries and the borrowed view of one wide
//! CLIDATA row.

use crate::constants::{DAYS_PER_ROW, KNOTS_TO_METERS_PER_SECOND};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod import_run;

pub use import_run::{ImportRun, RunStatus};

// =============================================================================
// Observation Fields
// =============================================================================

/// Target columns of a synoptic observation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationField {
    Temperature,
    MaxTemperature,
    MinTemperature,
    RelativeHumidity,
    WindSpeed,
    WindDirection,
    Pressure,
    Rainfall,
}

impl ObservationField {
    /// Every field, in storage column order
    pub const ALL: [ObservationField; 8] = [
        ObservationField::Temperature,
        ObservationField::MaxTemperature,
        ObservationField::MinTemperature,
        ObservationField::RelativeHumidity,
        ObservationField::WindSpeed,
        ObservationField::WindDirection,
        ObservationField::Pressure,
        ObservationField::Rainfall,
    ];

    /// Column name in the `synoptic_observations` table
    pub fn column_name(&self) -> &'static str {
        match self {
            ObservationField::Temperature => "temperature",
            ObservationField::MaxTemperature => "max_temperature",
            ObservationField::MinTemperature => "min_temperature",
            ObservationField::RelativeHumidity => "relative_humidity",
            ObservationField::WindSpeed => "wind_speed",
            ObservationField::WindDirection => "wind_direction",
            ObservationField::Pressure => "pressure",
            ObservationField::Rainfall => "rainfall",
        }
    }
}

impl fmt::Display for ObservationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for ObservationField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ObservationField::ALL
            .iter()
            .copied()
            .find(|field| field.column_name() == wanted)
            .ok_or_else(|| format!("unknown observation field '{}'", s))
    }
}

// =============================================================================
// Unit Conversion
// =============================================================================

/// Conversion applied to a source value before it is stored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitConversion {
    /// Store the value unchanged
    #[default]
    Identity,
    /// Knots to metres per second
    KnotsToMetersPerSecond,
    /// Whole percent; values outside 0..=100 are rejected
    Percentage,
    /// `value * scale + offset`
    Linear { scale: f64, offset: f64 },
}

impl UnitConversion {
    /// Convert a source value into the stored unit.
    ///
    /// Returns `None` when the value cannot be stored in the target unit.
    pub fn apply(&self, value: f64) -> Option<f64> {
        let converted = match self {
            UnitConversion::Identity => value,
            UnitConversion::KnotsToMetersPerSecond => value * KNOTS_TO_METERS_PER_SECOND,
            UnitConversion::Percentage if (0.0..=100.0).contains(&value) => value.round(),
            UnitConversion::Percentage => return None,
            UnitConversion::Linear { scale, offset } => value * scale + offset,
        };
        converted.is_finite().then_some(converted)
    }
}

// =============================================================================
// Observation Keys, Tuples and Records
// =============================================================================

/// Identifies one instantaneous reading: a station at a UTC instant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObservationKey {
    pub station_code: String,
    pub timestamp: DateTime<Utc>,
}

impl ObservationKey {
    pub fn new(station_code: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            station_code: station_code.into(),
            timestamp,
        }
    }
}

impl fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.station_code,
            self.timestamp.format("%Y-%m-%dT%H:%MZ")
        )
    }
}

/// One converted value produced by row expansion
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTuple {
    pub key: ObservationKey,
    pub field: ObservationField,
    pub value: f64,
}

/// Fields accumulated for one observation key.
///
/// A record only carries the fields seen in the current run; persisting it
/// updates those columns and leaves every other column untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub key: ObservationKey,
    pub fields: BTreeMap<ObservationField, f64>,
}

impl ObservationRecord {
    pub fn new(key: ObservationKey) -> Self {
        Self {
            key,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field, returning the value it replaced
    pub fn set(&mut self, field: ObservationField, value: f64) -> Option<f64> {
        self.fields.insert(field, value)
    }

    pub fn get(&self, field: ObservationField) -> Option<f64> {
        self.fields.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

// =============================================================================
// Stations
// =============================================================================

/// A station as held by the persisted catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Internal station code (e.g. "DGAA")
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub region: String,
}

// =============================================================================
// CLIDATA Rows
// =============================================================================

/// One wide CLIDATA row, borrowing its text from the CSV record
#[derive(Debug, Clone, PartialEq)]
pub struct ClidataRow<'a> {
    /// Line in the source file, for diagnostics
    pub line: u64,
    pub station_id: &'a str,
    pub element: &'a str,
    pub year: i32,
    pub month: u32,
    /// `None` when the time column is absent or blank
    pub time: Option<NaiveTime>,
    pub data_type: Option<&'a str>,
    /// Raw cell text for days 1..=31; `None` when the column is absent
    pub days: [Option<&'a str>; DAYS_PER_ROW],
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<&'a str>,
}

impl<'a> ClidataRow<'a> {
    /// Raw cell text for a 1-based day number
    pub fn day_value(&self, day: u32) -> Option<&'a str> {
        let index = usize::try_from(day).ok()?.checked_sub(1)?;
        self.days.get(index).copied().flatten()
    }

    /// Station display name, empty when the file has none
    pub fn display_name(&self) -> &'a str {
        self.name.unwrap_or("")
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}
