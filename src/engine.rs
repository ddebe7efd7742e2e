//! InsightEngine facade
//!
//! Owns the dataset registry and runs queries end to end:
//! parse and validate, then execute against the target dataset snapshot.
//! Subsystem errors pass through unchanged inside `EngineError`.

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::{Dataset, DatasetError, DatasetInfo, DatasetRegistry};
use crate::executor::{
    ExecutionLimits, ExecutionResult, ExecutorError, QueryExecutor, ResultRow,
};
use crate::query::{QueryError, QueryValidator};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl EngineError {
    /// Returns the stable error code of the underlying error
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Dataset(e) => e.code().code(),
            EngineError::Query(e) => e.code().code(),
            EngineError::Executor(e) => e.code().code(),
        }
    }

    /// Returns the message of the underlying error
    pub fn message(&self) -> &str {
        match self {
            EngineError::Dataset(e) => e.message(),
            EngineError::Query(e) => e.message(),
            EngineError::Executor(e) => e.message(),
        }
    }

    /// Returns whether the engine hit a contract violation
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Executor(e) if e.is_fatal())
    }
}

/// Query engine over a set of registered datasets
#[derive(Debug, Default)]
pub struct InsightEngine {
    registry: DatasetRegistry,
    executor: QueryExecutor,
}

impl InsightEngine {
    /// Creates an engine with the default result cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given limits
    pub fn with_limits(limits: ExecutionLimits) -> Self {
        Self {
            registry: DatasetRegistry::new(),
            executor: QueryExecutor::new(limits),
        }
    }

    /// Returns the registry
    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Registers a dataset and returns the ids of all registered datasets
    pub fn add_dataset(&mut self, dataset: Dataset) -> EngineResult<Vec<String>> {
        Ok(self.registry.add(dataset)?)
    }

    /// Removes a dataset and returns its id
    pub fn remove_dataset(&mut self, id: &str) -> EngineResult<String> {
        Ok(self.registry.remove(id)?)
    }

    /// Lists registered datasets in registration order
    pub fn list_datasets(&self) -> Vec<DatasetInfo> {
        self.registry.list()
    }

    /// Returns true if the raw query would be accepted
    pub fn validate_query(&self, raw: &Value) -> bool {
        QueryValidator::new(&self.registry).is_valid(raw)
    }

    /// Runs a raw query and returns its rows
    pub fn perform_query(&self, raw: &Value) -> EngineResult<Vec<ResultRow>> {
        Ok(self.execute(raw)?.into_rows())
    }

    /// Runs a raw query and returns rows with execution counts
    pub fn execute(&self, raw: &Value) -> EngineResult<ExecutionResult> {
        let validated = QueryValidator::new(&self.registry)
            .validate(raw)
            .map_err(|e| {
                warn!(code = e.code().code(), error = %e, "query rejected");
                e
            })?;

        let dataset = self.registry.get(validated.dataset_id()).ok_or_else(|| {
            ExecutorError::internal(format!(
                "validated dataset '{}' is not registered",
                validated.dataset_id()
            ))
        })?;

        let result = self
            .executor
            .execute(&validated, &dataset)
            .map_err(|e| {
                warn!(code = e.code().code(), error = %e, "query failed");
                e
            })?;

        info!(
            dataset_id = dataset.id(),
            rows = result.len(),
            "query completed"
        );
        Ok(result)
    }
}
