//! Query subsystem for insightql
//!
//! Turns an untyped JSON query into a `ValidatedQuery`, or rejects it with
//! `INSIGHT_INVALID_QUERY` before any row is scanned.
//!
//! # Design Principles
//!
//! - Explicit: one tag per filter node, unknown keys rejected
//! - Single dataset: every qualified key in a query names the same dataset
//! - Stateless: validation state is scoped to one call

mod ast;
mod errors;
mod parser;
mod pattern;
mod resolver;
mod validator;

pub use ast::{
    ApplyOp, ApplyRule, Comparator, Filter, Options, Order, QualifiedKey, Query, SortDirection,
    Transformations,
};
pub use errors::{QueryError, QueryErrorCode, QueryResult};
pub use parser::QueryParser;
pub use pattern::WildcardPattern;
pub use resolver::{ResolvedSchema, SchemaResolver};
pub use validator::{QueryValidator, ValidatedQuery};
