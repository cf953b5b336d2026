//! Command-line argument definitions for the CLIDATA importer

use crate::config::{ImportConfig, MappingConfig};
use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_PATH};
use crate::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the GMet CLIDATA importer
///
/// Loads wide-format CLIDATA exports (one row per station, element and month
/// with one column per day) into a SQLite database of synoptic observations.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gmet-import",
    version,
    about = "Import GMet CLIDATA exports into a SQLite observation store",
    long_about = "Reads wide-format CLIDATA CSV exports from the Ghana Meteorological Agency, \
                  maps element codes and station identifiers onto the observation schema and \
                  upserts one record per station and timestamp. Re-importing the same file \
                  leaves the database unchanged."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Import a CLIDATA file into the database
    Import(ImportArgs),
    /// Check a CLIDATA file without touching the database
    Audit(AuditArgs),
}

/// Arguments for the import command
#[derive(Debug, Clone, Parser)]
pub struct ImportArgs {
    /// CLIDATA CSV file to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// SQLite database holding stations and observations
    ///
    /// Created with the observation schema if it does not exist. Stations must
    /// already be present unless --register-stations is given.
    #[arg(
        short = 'd',
        long = "database",
        value_name = "PATH",
        default_value = DEFAULT_DATABASE_PATH,
        help = "SQLite database to import into"
    )]
    pub database: PathBuf,

    /// Map and validate every row without committing anything
    #[arg(
        long = "dry-run",
        help = "Validate and count everything but leave the database untouched"
    )]
    pub dry_run: bool,

    /// Source rows per committed batch
    ///
    /// Each batch is written in its own savepoint. A failing batch rolls back
    /// on its own; batches committed before it stay.
    #[arg(
        short = 'b',
        long = "batch-size",
        value_name = "ROWS",
        default_value_t = DEFAULT_BATCH_SIZE,
        help = "Source rows per committed batch"
    )]
    pub batch_size: usize,

    /// TOML file with element and station mapping tables
    ///
    /// Sections present in the file ([elements], [stations], [station_regions])
    /// replace the built-in tables of the same name.
    #[arg(
        short = 'm',
        long = "mappings",
        value_name = "FILE",
        help = "TOML file with element and station mappings"
    )]
    pub mappings: Option<PathBuf>,

    /// Create catalog entries for stations nobody knows
    #[arg(
        long = "register-stations",
        help = "Register stations missing from the catalog instead of skipping their rows"
    )]
    pub register_stations: bool,

    /// Keep cells equal to zero as real readings
    ///
    /// By default a zero cell is treated as missing, which also drops genuine
    /// zero readings such as dry days.
    #[arg(
        long = "keep-zero-values",
        help = "Store zero readings instead of treating them as missing"
    )]
    pub keep_zero_values: bool,

    /// First year to import (inclusive)
    #[arg(long = "from-year", value_name = "YEAR", help = "First year to import")]
    pub from_year: Option<i32>,

    /// Last year to import (inclusive)
    #[arg(long = "to-year", value_name = "YEAR", help = "Last year to import")]
    pub to_year: Option<i32>,

    /// Offset of the source times from UTC
    ///
    /// CLIDATA times are local to the export. Ghana keeps GMT, so the default
    /// of zero stores them unchanged.
    #[arg(
        long = "utc-offset-minutes",
        value_name = "MINUTES",
        default_value_t = 0,
        allow_hyphen_values = true,
        help = "Offset of the source times from UTC, in minutes"
    )]
    pub utc_offset_minutes: i32,

    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the import summary"
    )]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Also hides the progress bar.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the audit command
#[derive(Debug, Clone, Parser)]
pub struct AuditArgs {
    /// CLIDATA CSV file to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// TOML file with element and station mapping tables
    #[arg(
        short = 'm',
        long = "mappings",
        value_name = "FILE",
        help = "TOML file with element and station mappings"
    )]
    pub mappings: Option<PathBuf>,

    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the audit report"
    )]
    pub output_format: OutputFormat,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON for scripting
    Json,
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn load_mappings(path: Option<&PathBuf>) -> Result<MappingConfig> {
    match path {
        Some(path) => MappingConfig::from_file(path),
        None => Ok(MappingConfig::default()),
    }
}

impl ImportArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Progress bars are drawn unless quiet or emitting JSON
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }

    /// Build the import configuration, loading the mapping file if one was given
    pub fn to_config(&self) -> Result<ImportConfig> {
        let mut config = ImportConfig::default()
            .with_batch_size(self.batch_size)
            .with_mappings(load_mappings(self.mappings.as_ref())?)
            .with_year_range(self.from_year, self.to_year)
            .with_source_offset_minutes(self.utc_offset_minutes);

        if self.dry_run {
            config = config.with_dry_run();
        }
        if self.register_stations {
            config = config.with_station_registration();
        }
        if self.keep_zero_values {
            config = config.with_zero_values_kept();
        }

        config.validate()?;
        Ok(config)
    }
}

impl AuditArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }

    pub fn load_mappings(&self) -> Result<MappingConfig> {
        load_mappings(self.mappings.as_ref())
    }
}
