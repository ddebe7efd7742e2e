//! Structural parser from an untyped JSON value to a `Query`
//!
//! Checks shape only: required clauses are present, each filter node has
//! exactly one tag, AND/OR hold at least one child, NOT wraps exactly one
//! tagged filter, comparator operands have the right JSON type. Unknown keys
//! are rejected rather than ignored.

use serde_json::{Map, Value};

use super::ast::{
    ApplyOp, ApplyRule, Comparator, Filter, Options, Order, Query, SortDirection,
    Transformations,
};
use super::errors::{QueryError, QueryResult};
use super::pattern::WildcardPattern;

const QUERY_KEYS: &[&str] = &["WHERE", "OPTIONS", "TRANSFORMATIONS"];
const OPTIONS_KEYS: &[&str] = &["COLUMNS", "ORDER"];
const TRANSFORMATIONS_KEYS: &[&str] = &["GROUP", "APPLY"];
const ORDER_KEYS: &[&str] = &["dir", "keys"];

/// Parses raw query values
pub struct QueryParser;

impl QueryParser {
    /// Parses a raw query value into a typed query
    pub fn parse(raw: &Value) -> QueryResult<Query> {
        let obj = as_object(raw, "query")?;
        reject_unknown_keys(obj, QUERY_KEYS, "query")?;

        let filter = match obj.get("WHERE") {
            Some(Value::Null) | None => return Err(QueryError::invalid("Missing WHERE")),
            Some(where_block) => Self::parse_filter(where_block)?,
        };

        let options = match obj.get("OPTIONS") {
            Some(Value::Null) | None => return Err(QueryError::invalid("Missing OPTIONS")),
            Some(options) => Self::parse_options(options)?,
        };

        let transformations = match obj.get("TRANSFORMATIONS") {
            None => None,
            Some(t) => Some(Self::parse_transformations(t)?),
        };

        Ok(Query {
            filter,
            options,
            transformations,
        })
    }

    /// Parses one filter node and its children
    pub fn parse_filter(value: &Value) -> QueryResult<Filter> {
        let obj = as_object(value, "filter")?;

        let (tag, body) = match single_entry(obj) {
            Some(entry) => entry,
            None if obj.is_empty() => return Ok(Filter::All),
            None => {
                return Err(QueryError::invalid(format!(
                    "Filter node must have exactly one tag, found {}",
                    obj.len()
                )))
            }
        };

        match tag.as_str() {
            "AND" => Ok(Filter::And(Self::parse_children(tag, body)?)),
            "OR" => Ok(Filter::Or(Self::parse_children(tag, body)?)),
            "NOT" => {
                let inner = as_object(body, "NOT")?;
                if inner.len() != 1 {
                    return Err(QueryError::invalid(
                        "NOT must wrap exactly one tagged filter",
                    ));
                }
                Ok(Filter::not(Self::parse_filter(body)?))
            }
            "LT" => Self::parse_comparison(Comparator::Lt, body),
            "GT" => Self::parse_comparison(Comparator::Gt, body),
            "EQ" => Self::parse_comparison(Comparator::Eq, body),
            "IS" => {
                let (key, operand) = single_operand(body, "IS")?;
                let raw = operand.as_str().ok_or_else(|| {
                    QueryError::invalid_key(key.as_str(), "IS operand must be a string")
                })?;
                let pattern = WildcardPattern::parse(raw).ok_or_else(|| {
                    QueryError::invalid_key(
                        key.as_str(),
                        "wildcard '*' is only allowed at the start or end",
                    )
                })?;
                Ok(Filter::Is {
                    key: key.clone(),
                    pattern,
                })
            }
            other => Err(QueryError::invalid(format!("Unknown filter tag '{}'", other))),
        }
    }

    fn parse_children(tag: &str, body: &Value) -> QueryResult<Vec<Filter>> {
        let items = body
            .as_array()
            .ok_or_else(|| QueryError::invalid(format!("{} must be an array", tag)))?;
        if items.is_empty() {
            return Err(QueryError::invalid(format!(
                "{} must have at least one filter",
                tag
            )));
        }
        items.iter().map(Self::parse_filter).collect()
    }

    fn parse_comparison(comparator: Comparator, body: &Value) -> QueryResult<Filter> {
        let (key, operand) = single_operand(body, comparator.tag())?;
        let value = match operand {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
        .ok_or_else(|| {
            QueryError::invalid_key(
                key.as_str(),
                format!("{} operand must be a number", comparator.tag()),
            )
        })?;

        Ok(Filter::Compare {
            comparator,
            key: key.clone(),
            value,
        })
    }

    fn parse_options(value: &Value) -> QueryResult<Options> {
        let obj = as_object(value, "OPTIONS")?;
        reject_unknown_keys(obj, OPTIONS_KEYS, "OPTIONS")?;

        let columns = match obj.get("COLUMNS") {
            Some(columns) => string_array(columns, "COLUMNS")?,
            None => return Err(QueryError::invalid("Missing COLUMNS")),
        };

        let order = match obj.get("ORDER") {
            None => None,
            Some(order) => Some(Self::parse_order(order)?),
        };

        Ok(Options { columns, order })
    }

    fn parse_order(value: &Value) -> QueryResult<Order> {
        match value {
            Value::String(key) => Ok(Order::Key(key.clone())),
            Value::Object(obj) => {
                reject_unknown_keys(obj, ORDER_KEYS, "ORDER")?;

                let dir = obj
                    .get("dir")
                    .and_then(Value::as_str)
                    .and_then(SortDirection::parse)
                    .ok_or_else(|| QueryError::invalid("ORDER dir must be UP or DOWN"))?;

                let keys = match obj.get("keys") {
                    Some(keys) => string_array(keys, "ORDER keys")?,
                    None => return Err(QueryError::invalid("Missing ORDER keys")),
                };
                if keys.is_empty() {
                    return Err(QueryError::invalid("ORDER keys must not be empty"));
                }

                Ok(Order::Compound { dir, keys })
            }
            _ => Err(QueryError::invalid("ORDER must be a string or an object")),
        }
    }

    fn parse_transformations(value: &Value) -> QueryResult<Transformations> {
        let obj = as_object(value, "TRANSFORMATIONS")?;
        reject_unknown_keys(obj, TRANSFORMATIONS_KEYS, "TRANSFORMATIONS")?;

        let group = match obj.get("GROUP") {
            Some(group) => string_array(group, "GROUP")?,
            None => return Err(QueryError::invalid("Missing GROUP")),
        };

        let apply = match obj.get("APPLY") {
            Some(Value::Array(items)) => items
                .iter()
                .map(Self::parse_apply_rule)
                .collect::<QueryResult<Vec<_>>>()?,
            Some(_) => return Err(QueryError::invalid("APPLY must be an array")),
            None => return Err(QueryError::invalid("Missing APPLY")),
        };

        Ok(Transformations { group, apply })
    }

    fn parse_apply_rule(value: &Value) -> QueryResult<ApplyRule> {
        let obj = as_object(value, "APPLY rule")?;
        let (output, body) = single_entry(obj)
            .ok_or_else(|| QueryError::invalid("APPLY rule must have exactly one key"))?;

        let (token, source) = single_operand(body, "APPLY rule")?;
        let op = ApplyOp::parse(token).ok_or_else(|| {
            QueryError::invalid_key(output.as_str(), format!("unknown operator '{}'", token))
        })?;
        let source = source.as_str().ok_or_else(|| {
            QueryError::invalid_key(output.as_str(), "APPLY source must be a string key")
        })?;

        Ok(ApplyRule::new(output.clone(), op, source))
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> QueryResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| QueryError::invalid(format!("{} must be an object", what)))
}

fn single_entry(obj: &Map<String, Value>) -> Option<(&String, &Value)> {
    if obj.len() == 1 {
        obj.iter().next()
    } else {
        None
    }
}

/// Reads a `{ key: operand }` object with exactly one entry
fn single_operand<'a>(value: &'a Value, what: &str) -> QueryResult<(&'a String, &'a Value)> {
    let obj = as_object(value, what)?;
    single_entry(obj)
        .ok_or_else(|| QueryError::invalid(format!("{} must have exactly one key", what)))
}

fn string_array(value: &Value, what: &str) -> QueryResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| QueryError::invalid(format!("{} must be an array", what)))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| QueryError::invalid(format!("{} entries must be strings", what)))
        })
        .collect()
}

fn reject_unknown_keys(obj: &Map<String, Value>, allowed: &[&str], what: &str) -> QueryResult<()> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(QueryError::invalid(format!(
            "Unknown key '{}' in {}",
            key, what
        ))),
        None => Ok(()),
    }
}
