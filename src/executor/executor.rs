//! Query executor for insightql
//!
//! Executes validated queries against an in-memory dataset.
//!
//! Execution flow (strict order):
//! 1. Filter rows with WHERE, keeping dataset order
//! 2. Group and reduce (if TRANSFORMATIONS present)
//! 3. Check the result cap against the final cardinality
//! 4. Project onto COLUMNS
//! 5. Apply ORDER (if specified)

use tracing::debug;

use crate::dataset::Dataset;
use crate::query::ValidatedQuery;

use super::errors::{ExecutorError, ExecutorResult};
use super::filters::FilterEvaluator;
use super::projection::Projector;
use super::result::ExecutionResult;
use super::sorter::ResultSorter;
use super::transform::TransformEngine;

/// Hard upper bound on the number of rows a query may return
pub const MAX_RESULT_ROWS: usize = 5000;

/// Limits enforced while executing a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Maximum number of output rows, never above `MAX_RESULT_ROWS`
    pub max_results: usize,
}

impl ExecutionLimits {
    /// Creates limits with the given cap, clamped to `MAX_RESULT_ROWS`
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.min(MAX_RESULT_ROWS),
        }
    }
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULT_ROWS,
        }
    }
}

/// Query executor that runs validated queries against datasets
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    limits: ExecutionLimits,
}

impl QueryExecutor {
    /// Creates a new executor
    pub fn new(limits: ExecutionLimits) -> Self {
        Self { limits }
    }

    /// Returns the limits in force
    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }

    /// Executes a validated query against its dataset.
    ///
    /// Same query + same dataset = same rows in the same order.
    pub fn execute(
        &self,
        validated: &ValidatedQuery,
        dataset: &Dataset,
    ) -> ExecutorResult<ExecutionResult> {
        if validated.dataset_id() != dataset.id() {
            return Err(ExecutorError::internal(format!(
                "query targets '{}' but was given dataset '{}'",
                validated.dataset_id(),
                dataset.id()
            )));
        }

        let query = validated.query();

        // Step 1: WHERE
        let matched = FilterEvaluator::evaluate(&query.filter, dataset.rows())?;
        debug!(
            dataset_id = dataset.id(),
            scanned = dataset.len(),
            matched = matched.len(),
            "rows filtered"
        );

        // Steps 2-4: the cap applies to whatever reaches projection
        let (mut rows, group_count) = match &query.transformations {
            Some(transformations) => {
                let reduced = TransformEngine::transform(&matched, transformations)?;
                let group_count = reduced.len();
                self.check_cardinality(group_count)?;
                (
                    Projector::narrow(reduced, &query.options.columns)?,
                    Some(group_count),
                )
            }
            None => {
                self.check_cardinality(matched.len())?;
                (Projector::project(&matched, &query.options.columns)?, None)
            }
        };

        // Step 5: ORDER
        if let Some(order) = &query.options.order {
            ResultSorter::sort(&mut rows, order);
        }

        Ok(ExecutionResult {
            rows,
            scanned_count: dataset.len(),
            matched_count: matched.len(),
            group_count,
        })
    }

    fn check_cardinality(&self, count: usize) -> ExecutorResult<()> {
        if count > self.limits.max_results {
            return Err(ExecutorError::result_too_large(
                count,
                self.limits.max_results,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetKind, DatasetRegistry, Row};
    use crate::executor::ExecutorErrorCode;
    use crate::query::QueryValidator;
    use serde_json::{json, Value};

    fn room(shortname: &str, number: &str, seats: u64, furniture: &str) -> Row {
        let value = json!({
            "fullname": format!("{} Building", shortname),
            "shortname": shortname,
            "number": number,
            "name": format!("{}_{}", shortname, number),
            "address": "2329 West Mall",
            "lat": 49.26,
            "lon": -123.25,
            "seats": seats,
            "type": "Small Group",
            "furniture": furniture,
            "href": "http://example.org",
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn rooms() -> Dataset {
        Dataset::new(
            "rooms",
            DatasetKind::Rooms,
            vec![
                room("DMP", "110", 120, "Tables"),
                room("ANGU", "098", 260, "Chairs"),
                room("DMP", "310", 160, "Tables"),
                room("ANGU", "037", 54, "Tables"),
            ],
        )
        .unwrap()
    }

    fn run(dataset: &Dataset, raw: Value, limits: ExecutionLimits) -> ExecutorResult<ExecutionResult> {
        let mut registry = DatasetRegistry::new();
        registry.add(dataset.clone()).unwrap();
        let validated = QueryValidator::new(&registry).validate(&raw).unwrap();
        QueryExecutor::new(limits).execute(&validated, dataset)
    }

    #[test]
    fn test_filter_project_sort() {
        let result = run(
            &rooms(),
            json!({
                "WHERE": {"GT": {"rooms_seats": 100}},
                "OPTIONS": {"COLUMNS": ["rooms_name", "rooms_seats"], "ORDER": "rooms_seats"}
            }),
            ExecutionLimits::default(),
        )
        .unwrap();

        assert_eq!(result.scanned_count, 4);
        assert_eq!(result.matched_count, 3);
        assert_eq!(
            result.rows,
            vec![
                json!({"rooms_name": "DMP_110", "rooms_seats": 120}),
                json!({"rooms_name": "DMP_310", "rooms_seats": 160}),
                json!({"rooms_name": "ANGU_098", "rooms_seats": 260}),
            ]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_order_keeps_dataset_order() {
        let result = run(
            &rooms(),
            json!({
                "WHERE": {"IS": {"rooms_furniture": "Tables"}},
                "OPTIONS": {"COLUMNS": ["rooms_number"]}
            }),
            ExecutionLimits::default(),
        )
        .unwrap();
        let numbers: Vec<&Value> = result.iter().map(|r| &r["rooms_number"]).collect();
        assert_eq!(numbers, vec!["110", "310", "037"]);
    }

    #[test]
    fn test_group_and_apply() {
        let result = run(
            &rooms(),
            json!({
                "WHERE": {"IS": {"rooms_furniture": "*Tables*"}},
                "OPTIONS": {
                    "COLUMNS": ["rooms_shortname", "maxSeats"],
                    "ORDER": {"dir": "DOWN", "keys": ["maxSeats"]}
                },
                "TRANSFORMATIONS": {
                    "GROUP": ["rooms_shortname"],
                    "APPLY": [{"maxSeats": {"MAX": "rooms_seats"}}]
                }
            }),
            ExecutionLimits::default(),
        )
        .unwrap();

        assert_eq!(result.group_count, Some(2));
        assert_eq!(result.rows[0]["rooms_shortname"], json!("DMP"));
        assert_eq!(result.rows[0]["maxSeats"], json!(160));
        assert_eq!(result.rows[1]["maxSeats"], json!(54));
    }

    #[test]
    fn test_cap_applies_after_filter() {
        let err = run(
            &rooms(),
            json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["rooms_seats"]}}),
            ExecutionLimits::new(3),
        )
        .unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::InsightResultTooLarge);
        assert_eq!(err.row_count(), Some(4));
    }

    #[test]
    fn test_cap_applies_after_grouping() {
        let result = run(
            &rooms(),
            json!({
                "WHERE": {},
                "OPTIONS": {"COLUMNS": ["rooms_shortname"]},
                "TRANSFORMATIONS": {"GROUP": ["rooms_shortname"], "APPLY": []}
            }),
            ExecutionLimits::new(3),
        )
        .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.matched_count, 4);
    }

    #[test]
    fn test_limits_never_exceed_hard_cap() {
        assert_eq!(ExecutionLimits::new(10_000).max_results, MAX_RESULT_ROWS);
        assert_eq!(ExecutionLimits::default().max_results, 5000);
    }

    #[test]
    fn test_dataset_mismatch_is_internal() {
        let dataset = rooms();
        let mut registry = DatasetRegistry::new();
        registry.add(dataset.clone()).unwrap();
        let validated = QueryValidator::new(&registry)
            .validate(&json!({"WHERE": {}, "OPTIONS": {"COLUMNS": ["rooms_seats"]}}))
            .unwrap();

        let other = Dataset::new("other", DatasetKind::Rooms, vec![]).unwrap();
        let err = QueryExecutor::default().execute(&validated, &other).unwrap_err();
        assert!(err.is_fatal());
    }
}
