//! Audit command: report what an import of a file would run into

use super::shared::{is_json, print_json, setup_logging};
use crate::app::services::clidata_audit::{AuditReport, audit_file};
use crate::cli::args::AuditArgs;
use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

pub fn run_audit(args: AuditArgs) -> Result<ExitCode> {
    setup_logging(args.get_log_level(), false);

    let mappings = args.load_mappings().context("Invalid mapping file")?;
    let report = audit_file(&args.file, &mappings)
        .with_context(|| format!("Failed to audit {}", args.file.display()))?;

    if is_json(args.output_format) {
        print_json(&report)?;
    } else {
        print_human_report(&report);
    }

    Ok(if report.has_problems() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_human_report(report: &AuditReport) {
    println!("\n🔎 CLIDATA Audit: {}", report.source);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Rows: {}", report.rows);
    println!("   • Day columns: {}", report.day_columns);
    println!("   • Stations: {}", report.distinct_stations());
    if let (Some(first), Some(last)) = (report.first_year, report.last_year) {
        println!("   • Years: {}-{}", first, last);
    }
    println!("   • Rows without coordinates: {}", report.rows_missing_coordinates);

    println!("\n🏷️  Elements:");
    for (code, rows) in &report.elements {
        let label = if report.unknown_elements.contains(code) {
            format!("{} (unmapped)", code).yellow().to_string()
        } else {
            code.clone()
        };
        println!("   • {}: {} rows", label, rows);
    }

    if report.malformed_rows > 0 || report.unparseable_rows > 0 {
        println!(
            "{}",
            format!(
                "\n⚠️  {} malformed and {} unparseable rows",
                report.malformed_rows, report.unparseable_rows
            )
            .yellow()
        );
    }

    let conflicts = report.conflicting_station_names();
    if !conflicts.is_empty() {
        println!("\n📍 Stations listed under several names:");
        for id in conflicts {
            let names: Vec<&str> = report.stations[id].iter().map(String::as_str).collect();
            println!("   • {}: {}", id, names.join(", "));
        }
    }

    if report.has_problems() {
        println!("\n{}", "Problems found".yellow().bold());
    } else {
        println!("\n{}", "✅ No problems found".green().bold());
    }
    println!();
}
