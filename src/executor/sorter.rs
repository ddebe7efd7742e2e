//! Result sorting for query execution
//!
//! Sorting is stable: rows that compare equal keep their upstream order.

use std::cmp::Ordering;

use serde_json::Value;

use super::result::ResultRow;
use crate::query::{Order, SortDirection};

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows according to an ORDER clause.
    ///
    /// A single key sorts ascending. A compound order compares keys in
    /// sequence and DOWN reverses the whole comparison.
    pub fn sort(rows: &mut [ResultRow], order: &Order) {
        match order {
            Order::Key(key) => {
                rows.sort_by(|a, b| Self::compare_values(a.get(key), b.get(key)));
            }
            Order::Compound { dir, keys } => {
                rows.sort_by(|a, b| {
                    let ordering = keys
                        .iter()
                        .map(|key| Self::compare_values(a.get(key), b.get(key)))
                        .find(|ordering| ordering.is_ne())
                        .unwrap_or(Ordering::Equal);

                    match dir {
                        SortDirection::Up => ordering,
                        SortDirection::Down => ordering.reverse(),
                    }
                });
            }
        }
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < number < string < anything else
    /// - numbers numerically, strings by code point
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Number(_) => 0,
                        Value::String(_) => 1,
                        _ => 2,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);
                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Number(a_n), Value::Number(b_n)) => {
                        let a_f = a_n.as_f64().unwrap_or(0.0);
                        let b_f = b_n.as_f64().unwrap_or(0.0);
                        a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                    _ => Ordering::Equal,
                }
            }
        }
    }
}
