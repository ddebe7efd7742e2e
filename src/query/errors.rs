//! Query error types
//!
//! Error codes:
//! - INSIGHT_INVALID_QUERY (REJECT)
//!
//! Every validation failure collapses into the single invalid-query code,
//! including references to datasets that are not registered. The message
//! says which check failed.

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client query rejected before any row is scanned
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed or semantically invalid query
    InsightInvalidQuery,
}

impl QueryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::InsightInvalidQuery => "INSIGHT_INVALID_QUERY",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with context
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    key: Option<String>,
}

impl QueryError {
    /// Create an invalid query error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::InsightInvalidQuery,
            message: reason.into(),
            key: None,
        }
    }

    /// Create an invalid query error about a specific key
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            code: QueryErrorCode::InsightInvalidQuery,
            message: format!("Key '{}': {}", key, reason.into()),
            key: Some(key),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending key if applicable
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Display for QueryError {
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

impl std::error::Error for QueryError {}

/// Result type for query parsing and validation
pub type QueryResult<T> = Result<T, QueryError>;
