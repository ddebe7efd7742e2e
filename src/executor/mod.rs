//! Query Executor subsystem for insightql
//!
//! The executor consumes validated queries and produces deterministic results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter rows with WHERE
//! 2. Group and reduce with TRANSFORMATIONS (if present)
//! 3. Enforce the result cap on the final cardinality
//! 4. Project onto COLUMNS
//! 5. Sort by ORDER (if present)
//!
//! # Rules
//!
//! - Deterministic: same query and dataset give the same rows in the same order
//! - Rows are never mutated
//! - Anything validation should have excluded fails loudly as FATAL

mod aggregate;
mod errors;
mod executor;
mod filters;
mod projection;
mod result;
mod sorter;
mod transform;

pub use aggregate::{Aggregator, AGGREGATE_SCALE};
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::{ExecutionLimits, QueryExecutor, MAX_RESULT_ROWS};
pub use filters::{FilterEvaluator, FilterOp};
pub use projection::Projector;
pub use result::{ExecutionResult, ResultRow};
pub use sorter::ResultSorter;
pub use transform::{GroupValue, TransformEngine};
