//! CLIDATA import driver
//!
//! Opens a CLIDATA export, streams its records and drives them through the
//! element mapper, station mapper, row expander and upsert coordinator.
//! Per-row problems are counted and skipped; a store failure stops the run
//! but the statistics gathered up to that point are still returned.
//!
//! ## Usage
//!
//! ```no_run
//! use gmet_import::ImportConfig;
//! use gmet_import::app::services::import_driver::ImportDriver;
//! use gmet_import::app::services::observation_store::SqliteStore;
//! use std::path::Path;
//!
//! # fn example() -> gmet_import::Result<()> {
//! let store = SqliteStore::open(Path::new("gmet_weather.db"), false)?;
//! let mut driver = ImportDriver::new(ImportConfig::default(), store)?;
//! let outcome = driver.run(Path::new("clidata.csv"))?;
//!
//! println!("{}", outcome.stats.summary());
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod progress;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use driver::ImportDriver;
pub use progress::ImportProgress;
pub use stats::{ImportOutcome, ImportStatistics};
