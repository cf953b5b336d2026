use clap::Parser;
use gmet_import::cli::{args::Args, commands};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    match commands::run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}
