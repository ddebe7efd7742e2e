//! Dataset snapshot loader
//!
//! Reads the row snapshots written by the ingestion pipeline. A snapshot
//! file is a JSON array of row objects using unqualified field names.
//! Unreadable or malformed files are rejected; nothing is partially loaded.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::errors::{DatasetError, DatasetResult};
use super::types::{Dataset, DatasetKind, Row};

/// Loads dataset snapshot files from disk
pub struct DatasetLoader;

impl DatasetLoader {
    /// Loads a snapshot file into a dataset with the given id and kind.
    pub fn load(path: &Path, id: &str, kind: DatasetKind) -> DatasetResult<Dataset> {
        let content = fs::read_to_string(path).map_err(|e| {
            DatasetError::invalid(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            ))
        })?;

        let rows = Self::parse_rows(&content).map_err(|reason| {
            DatasetError::invalid(format!("Snapshot {}: {}", path.display(), reason))
        })?;

        debug!(path = %path.display(), rows = rows.len(), "snapshot parsed");
        Dataset::new(id, kind, rows)
    }

    /// Parses snapshot content into rows without checking their shape.
    pub fn parse_rows(content: &str) -> Result<Vec<Row>, String> {
        let document: Value =
            serde_json::from_str(content).map_err(|e| format!("Invalid JSON: {}", e))?;

        let items = match document {
            Value::Array(items) => items,
            other => {
                return Err(format!(
                    "expected an array of rows, found {}",
                    json_type_name(&other)
                ))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(format!(
                    "row {} must be an object, found {}",
                    index,
                    json_type_name(&other)
                )),
            })
            .collect()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
