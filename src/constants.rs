//! Application constants for the CLIDATA importer
//!
//! This module contains default values, unit conversion factors, column
//! aliases and the built-in mapping tables used throughout the importer.

// =============================================================================
// Import Defaults
// =============================================================================

/// Number of source rows processed between commits
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default SQLite database file, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "gmet_weather.db";

/// Number of day columns in a CLIDATA wide row
pub const DAYS_PER_ROW: usize = 31;

/// Hour used when a row has no time-of-day value
pub const DEFAULT_OBSERVATION_HOUR: u32 = 12;

/// Cell values that mean "no observation" in CLIDATA exports
pub const DEFAULT_MISSING_SENTINELS: &[&str] = &["-999", "-9999", "NaN", "NA"];

/// Region assigned to registered stations with no known region
pub const UNKNOWN_REGION: &str = "Unknown";

// =============================================================================
// Unit Conversion
// =============================================================================

/// 1 knot expressed in metres per second
pub const KNOTS_TO_METERS_PER_SECOND: f64 = 0.514444;

// =============================================================================
// CLIDATA Column Names
// =============================================================================

/// Accepted header spellings for each logical CLIDATA column.
///
/// Headers are compared after trimming, lower-casing and replacing `_` and
/// `-` with spaces, so `Station ID`, `station_id` and `STATION-ID` all match.
pub mod columns {
    pub const STATION_ID: &[&str] = &["station id", "station", "stationid", "id"];
    pub const ELEMENT: &[&str] = &["element id", "element", "elementid", "parameter"];
    pub const YEAR: &[&str] = &["year"];
    pub const MONTH: &[&str] = &["month"];
    pub const TIME: &[&str] = &["time", "time of day", "obs time"];
    pub const DATA_TYPE: &[&str] = &["data type", "datatype", "type"];
    /// GMet exports carry latitude in `Geogr1` and longitude in `Geogr2`
    pub const LATITUDE: &[&str] = &["geogr1", "lat", "latitude"];
    pub const LONGITUDE: &[&str] = &["geogr2", "lon", "long", "longitude"];
    pub const NAME: &[&str] = &["name", "station name"];
}

// =============================================================================
// Built-in Mapping Tables
// =============================================================================

/// Element codes understood out of the box
pub mod elements {
    /// Wind speed in knots
    pub const WIND_SPEED_KNOTS: &str = "KTS";
    /// Relative humidity in percent
    pub const RELATIVE_HUMIDITY: &str = "RH";
    /// Rainfall in millimetres
    pub const RAINFALL: &str = "RR";
    /// Maximum temperature in degrees Celsius
    pub const MAX_TEMPERATURE: &str = "TX";
    /// Minimum temperature in degrees Celsius
    pub const MIN_TEMPERATURE: &str = "TN";
    /// Station pressure in hPa
    pub const PRESSURE: &str = "P";
}

/// CLIDATA station identifier to internal station code
pub const DEFAULT_STATION_MAPPINGS: &[(&str, &str)] = &[
    ("23024TEM", "DGTM"),
    ("23022SAL", "DGSP"),
    ("23016ACC", "DGAA"),
    ("23003TDI", "DGTK"),
];

/// Station display name to administrative region
pub const DEFAULT_STATION_REGIONS: &[(&str, &str)] = &[
    ("Tema", "Greater Accra"),
    ("Accra", "Greater Accra"),
    ("Kumasi", "Ashanti"),
    ("Tamale", "Northern"),
    ("Takoradi", "Western"),
    ("Cape Coast", "Central"),
    ("Sunyani", "Bono"),
    ("Ho", "Volta"),
    ("Koforidua", "Eastern"),
    ("Wa", "Upper West"),
    ("Bolgatanga", "Upper East"),
];
