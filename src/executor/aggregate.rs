//! APPLY reductions over one group
//!
//! SUM and AVG accumulate in `rust_decimal::Decimal` and round half away from
//! zero to two places, so `[1.111, 2.222]` averages to exactly `1.67`.
//! MAX and MIN return the stored value unchanged. COUNT counts distinct values.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Number, Value};

use crate::dataset::Row;
use crate::query::ApplyOp;

use super::errors::{ExecutorError, ExecutorResult};
use super::transform::GroupValue;

/// Decimal places kept by SUM and AVG
pub const AGGREGATE_SCALE: u32 = 2;

/// Reduces the values of one field across a group
pub struct Aggregator;

impl Aggregator {
    /// Applies `op` to `field` over the rows of a non-empty group
    pub fn apply(op: ApplyOp, field: &str, rows: &[&Row]) -> ExecutorResult<Value> {
        if rows.is_empty() {
            return Err(ExecutorError::internal("aggregation over an empty group"));
        }

        match op {
            ApplyOp::Max => Self::extreme(field, rows, |candidate, best| candidate > best),
            ApplyOp::Min => Self::extreme(field, rows, |candidate, best| candidate < best),
            ApplyOp::Count => Self::count_distinct(field, rows),
            ApplyOp::Sum => {
                let sum = Self::decimal_sum(field, rows)?;
                decimal_to_value(round(sum))
            }
            ApplyOp::Avg => {
                let sum = Self::decimal_sum(field, rows)?;
                let avg = sum
                    .checked_div(Decimal::from(rows.len()))
                    .ok_or_else(|| ExecutorError::internal("AVG overflowed"))?;
                decimal_to_value(round(avg))
            }
        }
    }

    fn extreme(
        field: &str,
        rows: &[&Row],
        better: impl Fn(f64, f64) -> bool,
    ) -> ExecutorResult<Value> {
        let mut best: Option<(f64, &Value)> = None;
        for row in rows {
            let value = field_value(row, field)?;
            let number = value.as_f64().ok_or_else(|| not_numeric(field))?;
            match best {
                Some((current, _)) if !better(number, current) => {}
                _ => best = Some((number, value)),
            }
        }
        best.map(|(_, value)| value.clone())
            .ok_or_else(|| ExecutorError::internal("aggregation over an empty group"))
    }

    fn count_distinct(field: &str, rows: &[&Row]) -> ExecutorResult<Value> {
        let mut seen = HashSet::new();
        for row in rows {
            let value = field_value(row, field)?;
            let key = GroupValue::from_value(value).ok_or_else(|| {
                ExecutorError::internal(format!("field '{}' holds an uncountable value", field))
            })?;
            seen.insert(key);
        }
        Ok(Value::from(seen.len() as u64))
    }

    fn decimal_sum(field: &str, rows: &[&Row]) -> ExecutorResult<Decimal> {
        rows.iter().try_fold(Decimal::ZERO, |sum, row| {
            let value = to_decimal(field, field_value(row, field)?)?;
            sum.checked_add(value)
                .ok_or_else(|| ExecutorError::internal(format!("SUM of '{}' overflowed", field)))
        })
    }
}

fn field_value<'r>(row: &'r Row, field: &str) -> ExecutorResult<&'r Value> {
    row.get(field)
        .ok_or_else(|| ExecutorError::internal(format!("row is missing field '{}'", field)))
}

fn not_numeric(field: &str) -> ExecutorError {
    ExecutorError::internal(format!("field '{}' holds a non-numeric value", field))
}

/// Converts a JSON number to a decimal through its shortest textual form
fn to_decimal(field: &str, value: &Value) -> ExecutorResult<Decimal> {
    let Value::Number(number) = value else {
        return Err(not_numeric(field));
    };
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| {
            ExecutorError::internal(format!(
                "field '{}' holds {}, which is out of decimal range",
                field, text
            ))
        })
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AGGREGATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole results become JSON integers, the rest JSON floats
fn decimal_to_value(value: Decimal) -> ExecutorResult<Value> {
    if value.fract().is_zero() {
        if let Some(whole) = value.to_i64() {
            return Ok(Value::from(whole));
        }
    }
    value
        .to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ExecutorError::internal(format!("aggregate {} is not representable", value)))
}
