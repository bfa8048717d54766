//! # Service Bootstrap CLI
//!
//! This is the binary entry point for the `service-bootstrap` command-line
//! tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors and translating them into
//!   user-friendly output and exit codes.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

use service_bootstrap::output;

fn main() -> ExitCode {
    // clap exits with status 2 on usage errors.
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", output::error("Error:"), err);
            ExitCode::FAILURE
        }
    }
}
