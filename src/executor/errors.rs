//! Executor error types
//!
//! Error codes:
//! - INSIGHT_RESULT_TOO_LARGE (ERROR)
//! - INSIGHT_EXECUTION_INTERNAL (FATAL)

use std::fmt;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query failed but the engine is healthy
    Error,
    /// Validator and executor disagree; must not be swallowed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Executor error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Final cardinality exceeds the result cap
    InsightResultTooLarge,
    /// Evaluator reached a state validation should have excluded
    InsightExecutionInternal,
}

impl ExecutorErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::InsightResultTooLarge => "INSIGHT_RESULT_TOO_LARGE",
            ExecutorErrorCode::InsightExecutionInternal => "INSIGHT_EXECUTION_INTERNAL",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::InsightExecutionInternal => Severity::Fatal,
            ExecutorErrorCode::InsightResultTooLarge => Severity::Error,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with context
#[derive(Debug)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message
    message: String,
    /// Offending row count, for result-too-large
    row_count: Option<usize>,
}

impl ExecutorError {
    /// Create a result too large error
    pub fn result_too_large(row_count: usize, limit: usize) -> Self {
        Self {
            code: ExecutorErrorCode::InsightResultTooLarge,
            message: format!(
                "Query produced {} rows, more than the limit of {}",
                row_count, limit
            ),
            row_count: Some(row_count),
        }
    }

    /// Create an internal error (FATAL)
    pub fn internal(reason: impl Into<String>) -> Self {
        Self {
            code: ExecutorErrorCode::InsightExecutionInternal,
            message: reason.into(),
            row_count: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the row count if applicable
    pub fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
