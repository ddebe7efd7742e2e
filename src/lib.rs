//! insightql - A deterministic query engine for academic datasets
//!
//! Answers structured JSON queries (filter, group + aggregate, project, sort)
//! against in-memory section and room datasets.

pub mod cli;
pub mod dataset;
pub mod engine;
pub mod executor;
pub mod query;

pub use engine::{EngineError, EngineResult, InsightEngine};
