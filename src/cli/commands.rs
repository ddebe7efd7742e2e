//! CLI command implementations
//!
//! Every command loads the config and its datasets first. Query rejections
//! are written to stdout as error responses; only config, load and I/O
//! failures return `Err`.

use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;
use tracing::error;

use crate::engine::InsightEngine;

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::CliResult;
use super::io::{read_request, write_error, write_response};

/// Code reported when stdin is not JSON at all
const INVALID_QUERY: &str = "INSIGHT_INVALID_QUERY";

/// Entry point: parse args and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query { config } => query(&config),
        Command::Validate { config } => validate(&config),
        Command::Datasets { config } => datasets(&config),
    }
}

/// Run one query from stdin
pub fn query(config_path: &Path) -> CliResult<()> {
    let engine = Config::load(config_path)?.build_engine()?;
    query_with(&engine, &mut io::stdin().lock(), &mut io::stdout().lock())
}

/// Validate one query from stdin
pub fn validate(config_path: &Path) -> CliResult<()> {
    let engine = Config::load(config_path)?.build_engine()?;
    validate_with(&engine, &mut io::stdin().lock(), &mut io::stdout().lock())
}

/// List configured datasets
pub fn datasets(config_path: &Path) -> CliResult<()> {
    let engine = Config::load(config_path)?.build_engine()?;
    datasets_with(&engine, &mut io::stdout().lock())
}

/// Runs the query read from `input` and writes the response to `out`
pub fn query_with<R: Read, W: Write>(
    engine: &InsightEngine,
    input: &mut R,
    out: &mut W,
) -> CliResult<()> {
    let content = read_request(input)?;
    let raw: Value = match serde_json::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            return write_error(out, INVALID_QUERY, &format!("Query is not valid JSON: {}", e))
        }
    };

    match engine.perform_query(&raw) {
        Ok(rows) => {
            let rows = rows.into_iter().map(Value::Object).collect();
            write_response(out, "result", Value::Array(rows))
        }
        Err(e) => {
            if e.is_fatal() {
                error!(code = e.code(), error = %e, "query hit an internal error");
            }
            write_error(out, e.code(), e.message())
        }
    }
}

/// Validates the query read from `input` and writes the verdict to `out`
pub fn validate_with<R: Read, W: Write>(
    engine: &InsightEngine,
    input: &mut R,
    out: &mut W,
) -> CliResult<()> {
    let content = read_request(input)?;
    let valid = serde_json::from_str::<Value>(&content)
        .map(|raw| engine.validate_query(&raw))
        .unwrap_or(false);
    write_response(out, "valid", Value::Bool(valid))
}

/// Writes the dataset listing to `out`
pub fn datasets_with<W: Write>(engine: &InsightEngine, out: &mut W) -> CliResult<()> {
    let listing = serde_json::to_value(engine.list_datasets())?;
    write_response(out, "result", listing)
}
