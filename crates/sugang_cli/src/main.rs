//! `sugang` operator CLI.
//!
//! # Responsibility
//! - Resolve database/logging settings from flags and environment.
//! - Map core errors to stable exit codes: 1 not found, 2 conflict,
//!   3 anything else.

mod app;
mod commands;

use commands::CommandLine;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = CommandLine::parse_args();
    match app::run(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
