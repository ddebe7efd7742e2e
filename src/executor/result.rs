//! Result types for query execution

use serde_json::{Map, Value};

/// One output row: qualified keys or apply keys to values, in COLUMNS order
pub type ResultRow = Map<String, Value>;

/// Result of query execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Rows in result order
    pub rows: Vec<ResultRow>,
    /// Number of dataset rows scanned
    pub scanned_count: usize,
    /// Number of rows that passed WHERE
    pub matched_count: usize,
    /// Number of groups, if the query had TRANSFORMATIONS
    pub group_count: Option<usize>,
}

impl ExecutionResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no rows were produced
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over the rows
    pub fn iter(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter()
    }

    /// Consumes the result, returning its rows
    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }
}
