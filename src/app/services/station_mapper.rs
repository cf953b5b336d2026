//! Station identifier resolution
//!
//! Turns the station id and name carried by a CLIDATA row into the internal
//! station code used by the observation table. Resolution order:
//!
//! 1. the static mapping table (source id to code). A mapped code missing
//!    from the catalog is registered when registration is enabled and left
//!    unresolved otherwise;
//! 2. an exact match of the trimmed station name against the catalog;
//! 3. when registration is enabled, an existing catalog station whose code
//!    is the upper-cased source id, or else a newly registered station.
//!
//! Every distinct (id, name) pair touches the catalog once per run; later
//! rows are answered from a cache.

use crate::app::models::{ClidataRow, Station};
use crate::app::services::observation_store::StationCatalog;
use crate::config::MappingConfig;
use crate::constants::UNKNOWN_REGION;
use crate::Result;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Why a station could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Neither the mapping table nor the catalog knows the station
    NotFound,
    /// The mapping table names a code that is not in the catalog
    UnknownTargetCode(String),
    /// Several catalog stations share the row's name
    AmbiguousName(usize),
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NotFound => f.write_str("no mapping and no station with that name"),
            UnresolvedReason::UnknownTargetCode(code) => {
                write!(f, "mapped to '{}' which is not in the station catalog", code)
            }
            UnresolvedReason::AmbiguousName(count) => {
                write!(f, "name matches {} stations", count)
            }
        }
    }
}

/// Outcome of resolving one source station
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationResolution {
    /// Found through the static mapping table
    Mapped(String),
    /// Found by name in the catalog
    MatchedByName(String),
    /// Registered in (or matched by code against) the catalog
    Registered(String),
    Unresolved(UnresolvedReason),
}

impl StationResolution {
    /// Internal station code, if resolved
    pub fn code(&self) -> Option<&str> {
        match self {
            StationResolution::Mapped(code)
            | StationResolution::MatchedByName(code)
            | StationResolution::Registered(code) => Some(code),
            StationResolution::Unresolved(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct StationMapper {
    table: HashMap<String, String>,
    regions: HashMap<String, String>,
    register_unknown: bool,
    cache: HashMap<(String, String), StationResolution>,
    registered: usize,
}

impl StationMapper {
    pub fn new(mappings: &MappingConfig, register_unknown: bool) -> Self {
        let table = mappings
            .stations
            .iter()
            .map(|(source, code)| (source.trim().to_string(), code.trim().to_string()))
            .collect();
        let regions = mappings
            .station_regions
            .iter()
            .map(|(name, region)| (name.trim().to_string(), region.clone()))
            .collect();

        Self {
            table,
            regions,
            register_unknown,
            cache: HashMap::new(),
            registered: 0,
        }
    }

    /// Resolve the station of a row.
    ///
    /// Only catalog failures are returned as errors; an unknown station is
    /// an ordinary [`StationResolution::Unresolved`].
    pub fn resolve<C>(&mut self, row: &ClidataRow<'_>, catalog: &mut C) -> Result<StationResolution>
    where
        C: StationCatalog + ?Sized,
    {
        let cache_key = (row.station_id.trim().to_string(), row.display_name().trim().to_string());
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached.clone());
        }

        let resolution = self.resolve_uncached(row, catalog)?;
        debug!(
            "Station '{}' ({}) resolved as {:?}",
            cache_key.0, cache_key.1, resolution
        );
        self.cache.insert(cache_key, resolution.clone());
        Ok(resolution)
    }

    fn resolve_uncached<C>(&mut self, row: &ClidataRow<'_>, catalog: &mut C) -> Result<StationResolution>
    where
        C: StationCatalog + ?Sized,
    {
        let source_id = row.station_id.trim();
        let name = row.display_name().trim();

        if let Some(code) = self.table.get(source_id).cloned() {
            if catalog.station_by_code(&code)?.is_some() {
                return Ok(StationResolution::Mapped(code));
            }
            if self.register_unknown {
                return self.register(code, row, catalog);
            }
            return Ok(StationResolution::Unresolved(
                UnresolvedReason::UnknownTargetCode(code),
            ));
        }

        let mut ambiguous = None;
        if !name.is_empty() {
            let matches = catalog.stations_by_name(name)?;
            match matches.as_slice() {
                [station] => return Ok(StationResolution::MatchedByName(station.code.clone())),
                [] => {}
                several => ambiguous = Some(several.len()),
            }
        }

        if self.register_unknown {
            let code = source_id.to_ascii_uppercase();
            if catalog.station_by_code(&code)?.is_some() {
                return Ok(StationResolution::Registered(code));
            }
            return self.register(code, row, catalog);
        }

        Ok(StationResolution::Unresolved(match ambiguous {
            Some(count) => UnresolvedReason::AmbiguousName(count),
            None => UnresolvedReason::NotFound,
        }))
    }

    /// Create a catalog station under `code` from the row's metadata
    fn register<C>(
        &mut self,
        code: String,
        row: &ClidataRow<'_>,
        catalog: &mut C,
    ) -> Result<StationResolution>
    where
        C: StationCatalog + ?Sized,
    {
        let name = match row.display_name().trim() {
            "" => code.clone(),
            name => name.to_string(),
        };
        let region = self
            .regions
            .get(&name)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_REGION.to_string());

        let station = Station {
            code: code.clone(),
            name,
            latitude: row.latitude,
            longitude: row.longitude,
            region,
        };
        catalog.register_station(&station)?;
        self.registered += 1;
        info!(
            "Registered station {} ({}, {})",
            station.code, station.name, station.region
        );

        Ok(StationResolution::Registered(code))
    }

    /// Stations newly created in the catalog
    pub fn registered_count(&self) -> usize {
        self.registered
    }

    /// Distinct (id, name) pairs seen so far
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}
