//! CLI argument definitions using clap
//!
//! Commands:
//! - insightql query --config <path>
//! - insightql validate --config <path>
//! - insightql datasets --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// insightql - query engine for section and room datasets
#[derive(Parser, Debug)]
#[command(name = "insightql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one query read from stdin and print its result
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./insightql.json")]
        config: PathBuf,
    },

    /// Check one query read from stdin without running it
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./insightql.json")]
        config: PathBuf,
    },

    /// List the configured datasets
    Datasets {
        /// Path to configuration file
        #[arg(long, default_value = "./insightql.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
