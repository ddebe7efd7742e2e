//! GROUP and APPLY
//!
//! Rows are partitioned by their typed values at the GROUP fields. Groups are
//! emitted in the order their key was first seen, one output row per group
//! holding the group values plus one entry per APPLY rule.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::dataset::Row;
use crate::query::{QualifiedKey, Transformations};

use super::aggregate::Aggregator;
use super::errors::{ExecutorError, ExecutorResult};
use super::result::ResultRow;

/// A hashable field value used for grouping and distinct counting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupValue {
    /// Bit pattern of the number as f64, with -0 folded into 0
    Number(u64),
    Text(String),
}

impl GroupValue {
    /// Returns None for values that are neither numbers nor strings
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                let f = n.as_f64()?;
                let f = if f == 0.0 { 0.0 } else { f };
                Some(GroupValue::Number(f.to_bits()))
            }
            Value::String(s) => Some(GroupValue::Text(s.clone())),
            _ => None,
        }
    }
}

/// Applies TRANSFORMATIONS to filtered rows
pub struct TransformEngine;

impl TransformEngine {
    /// Groups `rows` and reduces every group to one output row
    pub fn transform(
        rows: &[&Row],
        transformations: &Transformations,
    ) -> ExecutorResult<Vec<ResultRow>> {
        let group_fields = transformations
            .group
            .iter()
            .map(|key| field_of(key).map(|field| (key.as_str(), field)))
            .collect::<ExecutorResult<Vec<_>>>()?;

        let mut groups: IndexMap<Vec<GroupValue>, Vec<&Row>> = IndexMap::new();
        for &row in rows {
            let key = group_fields
                .iter()
                .map(|(key, field)| {
                    row.get(*field)
                        .and_then(GroupValue::from_value)
                        .ok_or_else(|| {
                            ExecutorError::internal(format!("row has no groupable value for '{}'", key))
                        })
                })
                .collect::<ExecutorResult<Vec<_>>>()?;
            groups.entry(key).or_default().push(row);
        }

        debug!(
            rows = rows.len(),
            groups = groups.len(),
            "rows grouped"
        );

        let mut output = Vec::with_capacity(groups.len());
        for members in groups.values() {
            let mut reduced = ResultRow::new();
            // Every member agrees on the group fields
            let first = members[0];
            for (key, field) in &group_fields {
                let value = first.get(*field).cloned().ok_or_else(|| {
                    ExecutorError::internal(format!("row is missing field '{}'", field))
                })?;
                reduced.insert((*key).to_string(), value);
            }
            for rule in &transformations.apply {
                let field = field_of(&rule.source)?;
                reduced.insert(rule.output.clone(), Aggregator::apply(rule.op, field, members)?);
            }
            output.push(reduced);
        }

        Ok(output)
    }
}

fn field_of(key: &str) -> ExecutorResult<&str> {
    QualifiedKey::parse(key)
        .map(|qualified| qualified.field)
        .ok_or_else(|| ExecutorError::internal(format!("unqualified key '{}'", key)))
}
