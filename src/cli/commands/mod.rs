//! Command implementations for the gmet-import CLI
//!
//! Each subcommand lives in its own module:
//! - `import`: load a CLIDATA file into the SQLite store
//! - `audit`: check a CLIDATA file without touching any store

pub mod audit;
pub mod import;
pub mod shared;

use crate::cli::args::{Args, Commands};
use anyhow::Result;
use clap::CommandFactory;
use std::process::ExitCode;

/// Dispatch to the subcommand handler; prints help when none was given
pub fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Some(Commands::Import(import_args)) => import::run_import(import_args),
        Some(Commands::Audit(audit_args)) => audit::run_audit(audit_args),
        None => {
            Args::command().print_help()?;
            println!();
            Ok(ExitCode::SUCCESS)
        }
    }
}
