//! globalrefresh: periodic refresh driver coordinated through a shared lock.
//!
//! This is the main entry point for the `globalrefresh` CLI. It parses
//! arguments, sets up diagnostics, dispatches to the appropriate command
//! handler, and handles errors with proper exit codes.

mod cli;
mod commands;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod host;
pub mod locks;
pub mod logging;
pub mod protocol;
pub mod runtime;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init_logging(cli.verbose);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
