//! Column projection
//!
//! Plain queries read each column's field from the dataset row under its
//! qualified name. Transformed queries narrow the reduced rows, which already
//! use output names.

use crate::dataset::Row;
use crate::query::QualifiedKey;

use super::errors::{ExecutorError, ExecutorResult};
use super::result::ResultRow;

/// Projects rows onto the requested columns
pub struct Projector;

impl Projector {
    /// Projects dataset rows onto qualified columns
    pub fn project(rows: &[&Row], columns: &[String]) -> ExecutorResult<Vec<ResultRow>> {
        let fields = columns
            .iter()
            .map(|column| {
                QualifiedKey::parse(column)
                    .map(|qualified| (column, qualified.field))
                    .ok_or_else(|| {
                        ExecutorError::internal(format!("unqualified column '{}'", column))
                    })
            })
            .collect::<ExecutorResult<Vec<_>>>()?;

        rows.iter()
            .map(|row| {
                let mut projected = ResultRow::new();
                for (column, field) in &fields {
                    let value = row.get(*field).cloned().ok_or_else(|| missing(column))?;
                    projected.insert((*column).clone(), value);
                }
                Ok(projected)
            })
            .collect()
    }

    /// Keeps only `columns` of already transformed rows, in column order.
    ///
    /// A repeated column yields a single entry, as in `project`.
    pub fn narrow(rows: Vec<ResultRow>, columns: &[String]) -> ExecutorResult<Vec<ResultRow>> {
        rows.into_iter()
            .map(|row| {
                let mut narrowed = ResultRow::new();
                for column in columns {
                    let value = row.get(column).cloned().ok_or_else(|| missing(column))?;
                    narrowed.insert(column.clone(), value);
                }
                Ok(narrowed)
            })
            .collect()
    }
}

fn missing(column: &str) -> ExecutorError {
    ExecutorError::internal(format!("column '{}' has no value", column))
}
