//! Dataset error types
//!
//! Error codes:
//! - INSIGHT_INVALID_DATASET (REJECT)
//! - INSIGHT_DATASET_NOT_FOUND (REJECT)

use std::fmt;

/// Severity levels for dataset errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, registry unchanged
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Dataset-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetErrorCode {
    /// Bad id, duplicate id, or rows that do not match the dataset kind
    InsightInvalidDataset,
    /// No dataset registered under the given id
    InsightDatasetNotFound,
}

impl DatasetErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            DatasetErrorCode::InsightInvalidDataset => "INSIGHT_INVALID_DATASET",
            DatasetErrorCode::InsightDatasetNotFound => "INSIGHT_DATASET_NOT_FOUND",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for DatasetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Dataset error with context
#[derive(Debug, Clone)]
pub struct DatasetError {
    code: DatasetErrorCode,
    message: String,
    dataset_id: Option<String>,
}

impl DatasetError {
    /// Create an invalid dataset error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: DatasetErrorCode::InsightInvalidDataset,
            message: reason.into(),
            dataset_id: None,
        }
    }

    /// Create an invalid id error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            code: DatasetErrorCode::InsightInvalidDataset,
            message: format!("Invalid dataset id '{}'", id),
            dataset_id: Some(id),
        }
    }

    /// Create a duplicate id error
    pub fn duplicate(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            code: DatasetErrorCode::InsightInvalidDataset,
            message: format!("Dataset '{}' already exists", id),
            dataset_id: Some(id),
        }
    }

    /// Create a malformed row error
    pub fn malformed_row(id: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            code: DatasetErrorCode::InsightInvalidDataset,
            message: format!("Dataset '{}' row {}: {}", id, row, reason.into()),
            dataset_id: Some(id),
        }
    }

    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            code: DatasetErrorCode::InsightDatasetNotFound,
            message: format!("Dataset '{}' not found", id),
            dataset_id: Some(id),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DatasetErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the dataset id if applicable
    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }
}

impl fmt::Display for DatasetError {
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

impl std::error::Error for DatasetError {}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
