//! Filter evaluation for query execution
//!
//! The filter tree is compiled once per query into a `Condition` with every
//! NOT pushed down to the leaves, then matched row by row in dataset order.
//!
//! - NOT over AND/OR expands by De Morgan
//! - NOT over a leaf inverts its comparator (LT becomes >=, IS becomes mismatch)
//! - A row lacking the field, or holding the wrong type, matches neither a
//!   leaf nor its inversion
//!
//! No type coercion: numeric leaves only see JSON numbers, IS only sees strings.

use serde_json::Value;

use crate::dataset::Row;
use crate::query::{Comparator, Filter, QualifiedKey, WildcardPattern};

use super::errors::{ExecutorError, ExecutorResult};

/// Numeric comparison operators after negation push-down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    fn from_comparator(comparator: Comparator) -> Self {
        match comparator {
            Comparator::Lt => FilterOp::Lt,
            Comparator::Gt => FilterOp::Gt,
            Comparator::Eq => FilterOp::Eq,
        }
    }

    /// Returns the operator matching exactly the values this one rejects
    pub fn negate(self) -> Self {
        match self {
            FilterOp::Eq => FilterOp::Ne,
            FilterOp::Ne => FilterOp::Eq,
            FilterOp::Gt => FilterOp::Lte,
            FilterOp::Gte => FilterOp::Lt,
            FilterOp::Lt => FilterOp::Gte,
            FilterOp::Lte => FilterOp::Gt,
        }
    }

    /// Applies the operator to `actual` against `bound`
    pub fn apply(self, actual: f64, bound: f64) -> bool {
        match self {
            FilterOp::Eq => actual == bound,
            FilterOp::Ne => actual != bound,
            FilterOp::Gt => actual > bound,
            FilterOp::Gte => actual >= bound,
            FilterOp::Lt => actual < bound,
            FilterOp::Lte => actual <= bound,
        }
    }
}

/// Negation-free form of a filter over unqualified row fields
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    All,
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Numeric {
        field: String,
        op: FilterOp,
        bound: f64,
    },
    Pattern {
        field: String,
        pattern: WildcardPattern,
        negated: bool,
    },
}

impl Condition {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::All => true,
            Condition::And(children) => children.iter().all(|c| c.matches(row)),
            Condition::Or(children) => children.iter().any(|c| c.matches(row)),
            Condition::Numeric { field, op, bound } => row
                .get(field)
                .and_then(Value::as_f64)
                .map_or(false, |actual| op.apply(actual, *bound)),
            Condition::Pattern {
                field,
                pattern,
                negated,
            } => row
                .get(field)
                .and_then(Value::as_str)
                .map_or(false, |actual| pattern.matches(actual) != *negated),
        }
    }
}

/// Evaluates validated filters against dataset rows
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Returns the rows matching `filter`, in dataset order.
    ///
    /// Fails only if the filter could not have passed validation.
    pub fn evaluate<'r>(filter: &Filter, rows: &'r [Row]) -> ExecutorResult<Vec<&'r Row>> {
        let condition = Self::compile(filter, false)?;
        Ok(rows.iter().filter(|row| condition.matches(row)).collect())
    }

    /// Checks a single row against `filter`
    pub fn matches(filter: &Filter, row: &Row) -> ExecutorResult<bool> {
        Ok(Self::compile(filter, false)?.matches(row))
    }

    fn compile(filter: &Filter, negated: bool) -> ExecutorResult<Condition> {
        match filter {
            Filter::All if negated => Err(ExecutorError::internal(
                "NOT over an empty filter reached the evaluator",
            )),
            Filter::All => Ok(Condition::All),
            Filter::And(children) | Filter::Or(children) => {
                if children.is_empty() {
                    return Err(ExecutorError::internal(format!(
                        "{} without children reached the evaluator",
                        filter.tag()
                    )));
                }
                let compiled = children
                    .iter()
                    .map(|child| Self::compile(child, negated))
                    .collect::<ExecutorResult<Vec<_>>>()?;

                let conjunction = matches!(filter, Filter::And(_)) != negated;
                Ok(if conjunction {
                    Condition::And(compiled)
                } else {
                    Condition::Or(compiled)
                })
            }
            Filter::Not(inner) => Self::compile(inner, !negated),
            Filter::Compare {
                comparator,
                key,
                value,
            } => {
                let op = FilterOp::from_comparator(*comparator);
                Ok(Condition::Numeric {
                    field: Self::field_of(key)?,
                    op: if negated { op.negate() } else { op },
                    bound: *value,
                })
            }
            Filter::Is { key, pattern } => Ok(Condition::Pattern {
                field: Self::field_of(key)?,
                pattern: pattern.clone(),
                negated,
            }),
        }
    }

    fn field_of(key: &str) -> ExecutorResult<String> {
        QualifiedKey::parse(key)
            .map(|qualified| qualified.field.to_string())
            .ok_or_else(|| ExecutorError::internal(format!("unqualified filter key '{}'", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("row fixture must be an object"),
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            row(json!({"dept": "cpsc", "avg": 95, "id": "310"})),
            row(json!({"dept": "math", "avg": 70.5, "id": "100"})),
            row(json!({"dept": "cpsc", "avg": 60, "id": "110"})),
        ]
    }

    fn depts(matched: &[&Row]) -> Vec<String> {
        matched
            .iter()
            .map(|r| format!("{}{}", r["dept"].as_str().unwrap(), r["id"].as_str().unwrap()))
            .collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let rows = rows();
        assert_eq!(FilterEvaluator::evaluate(&Filter::All, &rows).unwrap().len(), 3);
    }

    #[test]
    fn test_numeric_comparators() {
        let rows = rows();
        let gt = FilterEvaluator::evaluate(&Filter::gt("s_avg", 70.0), &rows).unwrap();
        assert_eq!(depts(&gt), vec!["cpsc310", "math100"]);

        let eq = FilterEvaluator::evaluate(&Filter::eq("s_avg", 60.0), &rows).unwrap();
        assert_eq!(depts(&eq), vec!["cpsc110"]);

        let lt = FilterEvaluator::evaluate(&Filter::lt("s_avg", 60.0), &rows).unwrap();
        assert!(lt.is_empty());
    }

    #[test]
    fn test_not_inverts_comparator() {
        let rows = rows();
        // NOT LT 70.5 includes the boundary row
        let not_lt = Filter::not(Filter::lt("s_avg", 70.5));
        assert_eq!(
            depts(&FilterEvaluator::evaluate(&not_lt, &rows).unwrap()),
            vec!["cpsc310", "math100"]
        );

        let not_eq = Filter::not(Filter::eq("s_avg", 60.0));
        assert_eq!(FilterEvaluator::evaluate(&not_eq, &rows).unwrap().len(), 2);
    }

    #[test]
    fn test_is_wildcards() {
        let rows = rows();
        let is = Filter::is("s_dept", "cp*").unwrap();
        assert_eq!(FilterEvaluator::evaluate(&is, &rows).unwrap().len(), 2);

        let not_is = Filter::not(Filter::is("s_dept", "cp*").unwrap());
        assert_eq!(
            depts(&FilterEvaluator::evaluate(&not_is, &rows).unwrap()),
            vec!["math100"]
        );
    }

    #[test]
    fn test_de_morgan() {
        let rows = rows();
        let and = Filter::And(vec![
            Filter::is("s_dept", "cpsc").unwrap(),
            Filter::gt("s_avg", 90.0),
        ]);
        let not_and = Filter::not(and.clone());
        assert_eq!(
            depts(&FilterEvaluator::evaluate(&and, &rows).unwrap()),
            vec!["cpsc310"]
        );
        assert_eq!(
            depts(&FilterEvaluator::evaluate(&not_and, &rows).unwrap()),
            vec!["math100", "cpsc110"]
        );

        let not_or = Filter::not(Filter::Or(vec![
            Filter::is("s_dept", "math").unwrap(),
            Filter::lt("s_avg", 61.0),
        ]));
        assert_eq!(
            depts(&FilterEvaluator::evaluate(&not_or, &rows).unwrap()),
            vec!["cpsc310"]
        );
    }

    #[test]
    fn test_double_negation_is_identity() {
        let rows = rows();
        let f = Filter::Or(vec![Filter::gt("s_avg", 90.0), Filter::is("s_id", "1*").unwrap()]);
        let nn = Filter::not(Filter::not(f.clone()));
        assert_eq!(
            FilterEvaluator::evaluate(&f, &rows).unwrap(),
            FilterEvaluator::evaluate(&nn, &rows).unwrap()
        );
    }

    #[test]
    fn test_wrong_type_matches_neither_side() {
        let r = row(json!({"avg": "95", "dept": 3}));
        assert!(!FilterEvaluator::matches(&Filter::gt("s_avg", 0.0), &r).unwrap());
        assert!(!FilterEvaluator::matches(&Filter::not(Filter::gt("s_avg", 0.0)), &r).unwrap());
        let is = Filter::is("s_dept", "*").unwrap();
        assert!(!FilterEvaluator::matches(&is, &r).unwrap());
        assert!(!FilterEvaluator::matches(&Filter::not(is), &r).unwrap());
    }

    #[test]
    fn test_contract_violations_are_fatal() {
        let rows = rows();
        let err = FilterEvaluator::evaluate(&Filter::not(Filter::All), &rows).unwrap_err();
        assert!(err.is_fatal());
        assert!(FilterEvaluator::evaluate(&Filter::And(vec![]), &rows).is_err());
        assert!(FilterEvaluator::evaluate(&Filter::gt("avg", 1.0), &rows).is_err());
    }

    #[test]
    fn test_filter_op_negate_is_involution() {
        for op in [
            FilterOp::Eq,
            FilterOp::Ne,
            FilterOp::Gt,
            FilterOp::Gte,
            FilterOp::Lt,
            FilterOp::Lte,
        ] {
            assert_eq!(op.negate().negate(), op);
            assert_ne!(op.apply(1.0, 1.0), op.negate().apply(1.0, 1.0));
        }
    }
}
