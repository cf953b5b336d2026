//! GMet CLIDATA importer
//!
//! Loads wide-format CLIDATA exports from the Ghana Meteorological Agency
//! (one row per station, element and month, one column per day) into a
//! relational store of synoptic observations keyed by station and timestamp.
//!
//! The pipeline:
//! - Parse the CSV header into a column mapping and stream records
//! - Map element codes onto observation fields with unit conversion
//! - Resolve source station ids to catalog codes (static table, then name)
//! - Expand each row into one observation tuple per valid day
//! - Merge tuples into records and upsert them in batched transactions

pub mod config;
pub mod constants;
pub mod error;

pub mod app {
    pub mod models;
    pub mod services {
        pub mod clidata_audit;
        pub mod clidata_parser;
        pub mod element_mapper;
        pub mod import_driver;
        pub mod observation_store;
        pub mod row_expander;
        pub mod station_mapper;
        pub mod upsert_coordinator;
    }
}

pub mod cli {
    pub mod args;
    pub mod commands;
}

pub use app::models::{ObservationField, ObservationRecord, Station};
pub use config::{ImportConfig, MappingConfig};
pub use error::{ImportError, Result};
