//! Schema resolution
//!
//! Determines which single dataset a query targets: the first COLUMNS
//! entry if it is qualified, otherwise the first GROUP entry. The resolved
//! dataset must be registered.

use crate::dataset::{DatasetCatalog, DatasetKind, FieldType};

use super::ast::{QualifiedKey, Query};
use super::errors::{QueryError, QueryResult};

/// The dataset a query targets, with its field tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    dataset_id: String,
    kind: DatasetKind,
}

impl ResolvedSchema {
    pub fn new(dataset_id: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            kind,
        }
    }

    /// Returns the dataset id
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// Returns the dataset kind
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Legal numeric field names
    pub fn numeric_fields(&self) -> Vec<&'static str> {
        self.kind.numeric_fields()
    }

    /// Legal string field names
    pub fn string_fields(&self) -> Vec<&'static str> {
        self.kind.string_fields()
    }

    /// Returns the type of a field, or None if it is not legal for this dataset
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.kind.field_type(field)
    }
}

/// Resolves the target dataset of a query against a catalog
pub struct SchemaResolver<'a, C: DatasetCatalog> {
    catalog: &'a C,
}

impl<'a, C: DatasetCatalog> SchemaResolver<'a, C> {
    /// Creates a new resolver
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Resolves the dataset a query targets.
    ///
    /// Fails if neither the first column nor the first group key is
    /// qualified, or if the resolved id is not registered.
    pub fn resolve(&self, query: &Query) -> QueryResult<ResolvedSchema> {
        let first_column = query
            .options
            .columns
            .first()
            .filter(|key| QualifiedKey::is_qualified(key));
        let first_group = query
            .transformations
            .as_ref()
            .and_then(|t| t.group.first());

        let key = first_column
            .or(first_group)
            .ok_or_else(|| QueryError::invalid("Cannot determine the dataset of the query"))?;

        let qualified = QualifiedKey::parse(key)
            .ok_or_else(|| QueryError::invalid_key(key.as_str(), "not a qualified key"))?;

        let kind = self
            .catalog
            .dataset_kind(qualified.dataset_id)
            .ok_or_else(|| {
                QueryError::invalid_key(
                    key.as_str(),
                    format!("dataset '{}' not found", qualified.dataset_id),
                )
            })?;

        Ok(ResolvedSchema::new(qualified.dataset_id, kind))
    }
}
