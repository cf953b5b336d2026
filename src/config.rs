//! Configuration management and validation.
//!
//! Provides the import configuration (batch sizing, dry-run, missing-value
//! policy, time handling) and the mapping tables that translate CLIDATA
//! element codes and station identifiers into the target schema. Mapping
//! tables are plain values handed to the pipeline at construction, so tests
//! and callers can substitute their own without touching global state.

use crate::app::models::{ObservationField, UnitConversion};
use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MISSING_SENTINELS, DEFAULT_OBSERVATION_HOUR,
    DEFAULT_STATION_MAPPINGS, DEFAULT_STATION_REGIONS, elements,
};
use crate::error::{ImportError, Result};
use chrono::{FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// How one element code lands in the observation table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementRule {
    /// Target column
    pub field: ObservationField,

    /// Conversion from the source unit to the stored unit
    #[serde(default)]
    pub conversion: UnitConversion,
}

impl ElementRule {
    pub fn new(field: ObservationField, conversion: UnitConversion) -> Self {
        Self { field, conversion }
    }
}

/// Static mapping tables.
///
/// Loaded from TOML, each section that is present replaces the built-in
/// table of the same name; absent sections keep their defaults.
///
/// ```toml
/// [elements.KTS]
/// field = "wind_speed"
/// conversion = { kind = "knots_to_meters_per_second" }
///
/// [stations]
/// "23016ACC" = "DGAA"
///
/// [station_regions]
/// "Kotoka Intl" = "Greater Accra"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// Element code (matched case-insensitively) to target field
    pub elements: BTreeMap<String, ElementRule>,

    /// Source station identifier to internal station code
    pub stations: BTreeMap<String, String>,

    /// Station display name to region, used when registering stations
    pub station_regions: BTreeMap<String, String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        let elements = [
            (
                elements::WIND_SPEED_KNOTS,
                ElementRule::new(
                    ObservationField::WindSpeed,
                    UnitConversion::KnotsToMetersPerSecond,
                ),
            ),
            (
                elements::RELATIVE_HUMIDITY,
                ElementRule::new(
                    ObservationField::RelativeHumidity,
                    UnitConversion::Percentage,
                ),
            ),
            (
                elements::RAINFALL,
                ElementRule::new(ObservationField::Rainfall, UnitConversion::Identity),
            ),
            (
                elements::MAX_TEMPERATURE,
                ElementRule::new(ObservationField::MaxTemperature, UnitConversion::Identity),
            ),
            (
                elements::MIN_TEMPERATURE,
                ElementRule::new(ObservationField::MinTemperature, UnitConversion::Identity),
            ),
            (
                elements::PRESSURE,
                ElementRule::new(ObservationField::Pressure, UnitConversion::Identity),
            ),
        ]
        .into_iter()
        .map(|(code, rule)| (code.to_string(), rule))
        .collect();

        let stations = DEFAULT_STATION_MAPPINGS
            .iter()
            .map(|(source, code)| (source.to_string(), code.to_string()))
            .collect();

        let station_regions = DEFAULT_STATION_REGIONS
            .iter()
            .map(|(name, region)| (name.to_string(), region.to_string()))
            .collect();

        Self {
            elements,
            stations,
            station_regions,
        }
    }
}

impl MappingConfig {
    /// Parse mapping tables from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: MappingConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load mapping tables from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(
            "Loaded mappings from {}: {} elements, {} stations",
            path.display(),
            config.elements.len(),
            config.stations.len()
        );
        Ok(config)
    }

    /// Reject tables that would silently never match
    pub fn validate(&self) -> Result<()> {
        if let Some(code) = self.elements.keys().find(|code| code.trim().is_empty()) {
            return Err(ImportError::configuration(format!(
                "element code '{}' is blank",
                code
            )));
        }
        if let Some((source, _)) = self
            .stations
            .iter()
            .find(|(source, target)| source.trim().is_empty() || target.trim().is_empty())
        {
            return Err(ImportError::configuration(format!(
                "station mapping for '{}' has a blank identifier or target code",
                source
            )));
        }
        Ok(())
    }
}

/// Inclusive year filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    pub from: Option<i32>,
    pub to: Option<i32>,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        self.from.is_none_or(|from| year >= from) && self.to.is_none_or(|to| year <= to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Configuration for one import run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Source rows processed between commits
    pub batch_size: usize,

    /// Map and validate everything but never commit
    pub dry_run: bool,

    /// Treat a cell equal to zero as missing.
    ///
    /// Matches how the CLIDATA exports have historically been loaded, but it
    /// also discards genuine zero readings such as dry days.
    pub treat_zero_as_missing: bool,

    /// Cell values meaning "no observation" (empty cells always are)
    pub missing_sentinels: Vec<String>,

    /// Time used when a row has no time-of-day
    pub default_observation_time: NaiveTime,

    /// Offset of the source times from UTC, in minutes
    pub source_utc_offset_minutes: i32,

    /// Only rows whose year falls in this range are imported
    pub year_range: YearRange,

    /// Create catalog entries for stations that cannot be resolved
    pub register_unknown_stations: bool,

    /// Element and station mapping tables
    pub mappings: MappingConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
            treat_zero_as_missing: true,
            missing_sentinels: DEFAULT_MISSING_SENTINELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_observation_time: NaiveTime::from_hms_opt(DEFAULT_OBSERVATION_HOUR, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            source_utc_offset_minutes: 0,
            year_range: YearRange::default(),
            register_unknown_stations: false,
            mappings: MappingConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Set the number of rows per committed batch
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Keep cells equal to zero as real observations
    pub fn with_zero_values_kept(mut self) -> Self {
        self.treat_zero_as_missing = false;
        self
    }

    /// Replace the mapping tables
    pub fn with_mappings(mut self, mappings: MappingConfig) -> Self {
        self.mappings = mappings;
        self
    }

    /// Restrict the import to an inclusive range of years
    pub fn with_year_range(mut self, from: Option<i32>, to: Option<i32>) -> Self {
        self.year_range = YearRange { from, to };
        self
    }

    /// Register stations that neither the mapping table nor the catalog know
    pub fn with_station_registration(mut self) -> Self {
        self.register_unknown_stations = true;
        self
    }

    /// Set the offset of source times from UTC
    pub fn with_source_offset_minutes(mut self, minutes: i32) -> Self {
        self.source_utc_offset_minutes = minutes;
        self
    }

    /// Offset of the source times as a chrono offset
    pub fn source_offset(&self) -> Result<FixedOffset> {
        self.source_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ImportError::configuration(format!(
                    "source UTC offset of {} minutes is out of range",
                    self.source_utc_offset_minutes
                ))
            })
    }

    /// Check the configuration before a run
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ImportError::configuration("batch size must be at least 1"));
        }
        if let (Some(from), Some(to)) = (self.year_range.from, self.year_range.to) {
            if from > to {
                return Err(ImportError::configuration(format!(
                    "year range {}..={} is empty",
                    from, to
                )));
            }
        }
        self.source_offset()?;
        self.mappings.validate()
    }
}
