//! CLI module for insightql
//!
//! Provides command-line interface for:
//! - query: run one query read from stdin
//! - validate: check one query read from stdin
//! - datasets: list the configured datasets
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only JSON
//! responses.

mod args;
mod commands;
mod config;
mod errors;
mod io;

use tracing_subscriber::EnvFilter;

pub use args::{Cli, Command};
pub use commands::{datasets, datasets_with, query, query_with, run_command, validate, validate_with};
pub use config::{Config, DatasetEntry};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};

/// Installs the stderr log subscriber, then parses args and runs the command.
///
/// `RUST_LOG` selects the level; the default is `warn`.
pub fn run() -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    commands::run()
}
