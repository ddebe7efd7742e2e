//! Query validation
//!
//! Checks run in a fixed order because later checks assume earlier ones hold:
//!
//! 1. Structure (WHERE and OPTIONS present, one tag per filter node, ...)
//! 2. WHERE keys are qualified, registered, legal for their type, and
//!    name the same dataset
//! 3. TRANSFORMATIONS: GROUP keys legal, APPLY outputs distinct, sources
//!    appropriate for their operator
//! 4. COLUMNS non-empty and drawn from the dataset (or GROUP + APPLY outputs)
//! 5. ORDER keys are present in COLUMNS
//!
//! The "established dataset id" lives in a `ValidationContext` created per
//! call, so one validator can be shared between concurrent callers.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::dataset::{DatasetCatalog, FieldType};

use super::ast::{Filter, Options, QualifiedKey, Query, Transformations};
use super::errors::{QueryError, QueryResult};
use super::parser::QueryParser;
use super::resolver::{ResolvedSchema, SchemaResolver};

/// What a key position requires of the field it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRequirement {
    Numeric,
    String,
    Any,
}

impl FieldRequirement {
    fn admits(&self, ty: FieldType) -> bool {
        match self {
            FieldRequirement::Numeric => ty == FieldType::Number,
            FieldRequirement::String => ty == FieldType::String,
            FieldRequirement::Any => true,
        }
    }
}

/// Call-scoped validation state
#[derive(Debug, Default)]
struct ValidationContext {
    /// Dataset id fixed by the first qualified key seen
    established: Option<String>,
}

impl ValidationContext {
    fn establish(&mut self, key: &str, dataset_id: &str) -> QueryResult<()> {
        match &self.established {
            None => {
                self.established = Some(dataset_id.to_string());
                Ok(())
            }
            Some(id) if id == dataset_id => Ok(()),
            Some(id) => Err(QueryError::invalid_key(
                key,
                format!("references dataset '{}' but query uses '{}'", dataset_id, id),
            )),
        }
    }
}

/// A query that passed every validation check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    query: Query,
    schema: ResolvedSchema,
}

impl ValidatedQuery {
    /// Returns the typed query
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns the resolved target dataset
    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    /// Returns the target dataset id
    pub fn dataset_id(&self) -> &str {
        self.schema.dataset_id()
    }
}

/// Validates queries against a catalog of registered datasets
pub struct QueryValidator<'a, C: DatasetCatalog> {
    catalog: &'a C,
}

impl<'a, C: DatasetCatalog> QueryValidator<'a, C> {
    /// Creates a new validator
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Returns true if the raw query passes validation
    pub fn is_valid(&self, raw: &Value) -> bool {
        self.validate(raw).is_ok()
    }

    /// Parses and validates a raw query value
    pub fn validate(&self, raw: &Value) -> QueryResult<ValidatedQuery> {
        let query = QueryParser::parse(raw)?;
        self.validate_query(query)
    }

    /// Validates an already parsed query
    pub fn validate_query(&self, query: Query) -> QueryResult<ValidatedQuery> {
        let mut ctx = ValidationContext::default();

        self.check_filter(&query.filter, &mut ctx)?;

        if let Some(transformations) = &query.transformations {
            self.check_transformations(transformations, &mut ctx)?;
        }

        self.check_columns(&query, &mut ctx)?;
        check_order(&query.options)?;

        let schema = SchemaResolver::new(self.catalog).resolve(&query)?;
        match ctx.established.as_deref() {
            Some(id) if id == schema.dataset_id() => {}
            Some(id) => {
                return Err(QueryError::invalid(format!(
                    "Query references dataset '{}' but targets '{}'",
                    id,
                    schema.dataset_id()
                )))
            }
            None => return Err(QueryError::invalid("Query references no dataset")),
        }

        debug!(dataset_id = schema.dataset_id(), "query validated");
        Ok(ValidatedQuery { query, schema })
    }

    fn check_filter(&self, filter: &Filter, ctx: &mut ValidationContext) -> QueryResult<()> {
        match filter {
            Filter::All => Ok(()),
            Filter::And(children) | Filter::Or(children) => {
                if children.is_empty() {
                    return Err(QueryError::invalid(format!(
                        "{} must have at least one filter",
                        filter.tag()
                    )));
                }
                children
                    .iter()
                    .try_for_each(|child| self.check_filter(child, ctx))
            }
            Filter::Not(inner) => match inner.as_ref() {
                Filter::All => Err(QueryError::invalid(
                    "NOT must wrap exactly one tagged filter",
                )),
                inner => self.check_filter(inner, ctx),
            },
            Filter::Compare { key, value, .. } => {
                if !value.is_finite() {
                    return Err(QueryError::invalid_key(key.as_str(), "operand must be finite"));
                }
                self.check_key(key, FieldRequirement::Numeric, ctx)
            }
            Filter::Is { key, .. } => self.check_key(key, FieldRequirement::String, ctx),
        }
    }

    fn check_transformations(
        &self,
        transformations: &Transformations,
        ctx: &mut ValidationContext,
    ) -> QueryResult<()> {
        if transformations.group.is_empty() {
            return Err(QueryError::invalid("GROUP must not be empty"));
        }
        for key in &transformations.group {
            self.check_key(key, FieldRequirement::Any, ctx)?;
        }

        let mut outputs = HashSet::new();
        for rule in &transformations.apply {
            if rule.output.is_empty() || QualifiedKey::is_qualified(&rule.output) {
                return Err(QueryError::invalid_key(
                    rule.output.as_str(),
                    "apply key must be non-empty and contain no underscore",
                ));
            }
            if !outputs.insert(rule.output.as_str()) {
                return Err(QueryError::invalid_key(
                    rule.output.as_str(),
                    "duplicate apply key",
                ));
            }

            let requirement = if rule.op.requires_numeric() {
                FieldRequirement::Numeric
            } else {
                FieldRequirement::Any
            };
            self.check_key(&rule.source, requirement, ctx)?;
        }

        Ok(())
    }

    fn check_columns(&self, query: &Query, ctx: &mut ValidationContext) -> QueryResult<()> {
        let columns = &query.options.columns;
        if columns.is_empty() {
            return Err(QueryError::invalid("COLUMNS must not be empty"));
        }

        match &query.transformations {
            Some(transformations) => {
                for column in columns {
                    if !transformations.provides(column) {
                        return Err(QueryError::invalid_key(
                            column.as_str(),
                            "column must be a GROUP key or an APPLY key",
                        ));
                    }
                }
                Ok(())
            }
            None => columns
                .iter()
                .try_for_each(|column| self.check_key(column, FieldRequirement::Any, ctx)),
        }
    }

    /// Checks a qualified dataset key and records its dataset id
    fn check_key(
        &self,
        key: &str,
        requirement: FieldRequirement,
        ctx: &mut ValidationContext,
    ) -> QueryResult<()> {
        let qualified = QualifiedKey::parse(key)
            .ok_or_else(|| QueryError::invalid_key(key, "not a qualified key"))?;

        ctx.establish(key, qualified.dataset_id)?;

        let kind = self
            .catalog
            .dataset_kind(qualified.dataset_id)
            .ok_or_else(|| {
                QueryError::invalid_key(
                    key,
                    format!("dataset '{}' not found", qualified.dataset_id),
                )
            })?;

        match kind.field_type(qualified.field) {
            Some(ty) if requirement.admits(ty) => Ok(()),
            Some(ty) => Err(QueryError::invalid_key(
                key,
                format!("{} field not allowed here", ty.type_name()),
            )),
            None => Err(QueryError::invalid_key(
                key,
                format!("unknown field for {} dataset", kind.as_str()),
            )),
        }
    }
}

fn check_order(options: &Options) -> QueryResult<()> {
    let Some(order) = &options.order else {
        return Ok(());
    };
    for key in order.keys() {
        if !options.columns.contains(key) {
            return Err(QueryError::invalid_key(
                key.as_str(),
                "ORDER key must be in COLUMNS",
            ));
        }
    }
    Ok(())
}
