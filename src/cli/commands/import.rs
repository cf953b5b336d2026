//! Import command: CLIDATA file into the SQLite store

use super::shared::{format_elapsed, is_json, print_json, setup_logging};
use crate::app::services::import_driver::{ImportDriver, ImportOutcome, ImportStatistics};
use crate::app::services::observation_store::SqliteStore;
use crate::cli::args::ImportArgs;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};

/// How many unmapped codes or stations the human summary lists
const LISTED_UNMAPPED: usize = 10;

#[derive(Serialize)]
struct JsonReport<'a> {
    success: bool,
    error: Option<String>,
    #[serde(flatten)]
    stats: &'a ImportStatistics,
}

pub fn run_import(args: ImportArgs) -> Result<ExitCode> {
    setup_logging(args.get_log_level(), args.quiet);

    let config = args.to_config().context("Invalid import options")?;
    let store = SqliteStore::open(&args.database, config.dry_run)
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;
    info!("Using database {}", args.database.display());

    let mut driver = ImportDriver::new(config, store)?.with_progress(args.show_progress());
    let outcome = driver
        .run(&args.file)
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    if let Some(failure) = &outcome.failure {
        error!("Import stopped: {}", failure);
    }

    if is_json(args.output_format) {
        print_json(&JsonReport {
            success: outcome.is_success(),
            error: outcome.failure.as_ref().map(|e| e.to_string()),
            stats: &outcome.stats,
        })?;
    } else if !args.quiet {
        print_human_report(&outcome);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_human_report(outcome: &ImportOutcome) {
    let stats = &outcome.stats;

    match &outcome.failure {
        None if stats.dry_run => println!("\n{}", "🔍 Dry Run Complete (nothing committed)".bold()),
        None => println!("\n{}", "🎉 CLIDATA Import Complete!".green().bold()),
        Some(_) => println!("\n{}", "❌ CLIDATA Import Failed".red().bold()),
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📊 Import Summary for {}:", stats.source);
    println!("   • Rows processed: {}", stats.rows_processed);
    if stats.rows_filtered > 0 {
        println!("   • Rows outside year range: {}", stats.rows_filtered);
    }
    println!("   • Observations created: {}", stats.observations_created);
    println!("   • Observations updated: {}", stats.observations_updated);
    println!("   • Batches committed: {}", stats.batches_committed);
    println!(
        "   • Stations: {}, elements: {}",
        stats.distinct_stations(),
        stats.distinct_elements()
    );
    if stats.stations_registered > 0 {
        println!("   • Stations registered: {}", stats.stations_registered);
    }
    println!("   • Success rate: {:.1}%", stats.success_rate());
    println!("   • Processing time: {}", format_elapsed(stats.elapsed_seconds));

    if stats.errors > 0 {
        println!(
            "{}",
            format!("⚠️  Errors encountered: {}", stats.errors).yellow()
        );
        println!(
            "   • Malformed rows: {}, invalid values: {}, unmapped station rows: {}",
            stats.malformed_rows, stats.invalid_values, stats.unmapped_station_rows
        );
    }
    if stats.invalid_dates > 0 {
        println!("   • Day cells past month end: {}", stats.invalid_dates);
    }

    if !stats.unmapped_elements.is_empty() {
        println!("\n🏷️  Unmapped elements ({} rows):", stats.unmapped_element_rows);
        for (code, rows) in stats.unmapped_elements.iter().take(LISTED_UNMAPPED) {
            println!("   • {}: {} rows", code, rows);
        }
    }
    if !stats.unmapped_stations.is_empty() {
        println!("\n📍 Unmapped stations:");
        for (station, rows) in stats.unmapped_stations.iter().take(LISTED_UNMAPPED) {
            println!("   • {}: {} rows", station, rows);
        }
        if stats.unmapped_stations.len() > LISTED_UNMAPPED {
            println!(
                "   • ... and {} more",
                stats.unmapped_stations.len() - LISTED_UNMAPPED
            );
        }
    }

    if let Some(failure) = &outcome.failure {
        println!("\n{} {}", "Error:".red().bold(), failure);
    }
    println!();
}
