//! Configuration file handling
//!
//! ```json
//! { "data_dir": "./data",
//!   "datasets": [ { "id": "sections", "kind": "sections", "file": "sections.json" } ],
//!   "max_results": 5000 }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{is_valid_dataset_id, DatasetKind, DatasetLoader};
use crate::engine::InsightEngine;
use crate::executor::{ExecutionLimits, MAX_RESULT_ROWS};

use super::errors::{CliError, CliResult};

/// One dataset snapshot to load at start-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Dataset id queries refer to
    pub id: String,
    /// Row schema of the snapshot
    pub kind: DatasetKind,
    /// Snapshot file, relative to `data_dir`
    pub file: String,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Snapshots to load (optional, default none)
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,

    /// Result cap (optional, default 5000, never above 5000)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    MAX_RESULT_ROWS
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.max_results == 0 {
            return Err(CliError::config_error("max_results must be > 0"));
        }
        if self.max_results > MAX_RESULT_ROWS {
            return Err(CliError::config_error(format!(
                "max_results must be <= {}",
                MAX_RESULT_ROWS
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.datasets {
            if !is_valid_dataset_id(&entry.id) {
                return Err(CliError::config_error(format!(
                    "Invalid dataset id: '{}'",
                    entry.id
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CliError::config_error(format!(
                    "Dataset '{}' is configured twice",
                    entry.id
                )));
            }
        }

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Resolves a dataset entry's snapshot path
    pub fn snapshot_path(&self, entry: &DatasetEntry) -> PathBuf {
        self.data_path().join(&entry.file)
    }

    /// Execution limits derived from this config
    pub fn limits(&self) -> ExecutionLimits {
        ExecutionLimits::new(self.max_results)
    }

    /// Builds an engine with every configured dataset loaded
    pub fn build_engine(&self) -> CliResult<InsightEngine> {
        let mut engine = InsightEngine::with_limits(self.limits());

        for entry in &self.datasets {
            let path = self.snapshot_path(entry);
            let dataset = DatasetLoader::load(&path, &entry.id, entry.kind)
                .map_err(|e| CliError::load_failed(e.to_string()))?;
            engine
                .add_dataset(dataset)
                .map_err(|e| CliError::load_failed(e.to_string()))?;
            debug!(dataset_id = %entry.id, path = %path.display(), "dataset loaded");
        }

        Ok(engine)
    }
}
