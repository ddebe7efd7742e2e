//! Dataset type definitions
//!
//! Two dataset kinds are supported:
//! - sections: `uuid, id, title, instructor, dept, year, avg, pass, fail, audit`
//! - rooms: `fullname, shortname, number, name, address, lat, lon, seats, type, furniture, href`
//!
//! Rows are flat maps from unqualified field name to a JSON string or number.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{DatasetError, DatasetResult};

/// A single dataset row keyed by unqualified field name
pub type Row = Map<String, Value>;

/// Value type of a dataset field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON number
    Number,
    /// JSON string
    String,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::String => "string",
        }
    }

    /// Checks whether a JSON value has this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Number => value.is_number(),
            FieldType::String => value.is_string(),
        }
    }
}

const SECTIONS_FIELDS: &[(&str, FieldType)] = &[
    ("uuid", FieldType::String),
    ("id", FieldType::String),
    ("title", FieldType::String),
    ("instructor", FieldType::String),
    ("dept", FieldType::String),
    ("year", FieldType::Number),
    ("avg", FieldType::Number),
    ("pass", FieldType::Number),
    ("fail", FieldType::Number),
    ("audit", FieldType::Number),
];

const ROOMS_FIELDS: &[(&str, FieldType)] = &[
    ("fullname", FieldType::String),
    ("shortname", FieldType::String),
    ("number", FieldType::String),
    ("name", FieldType::String),
    ("address", FieldType::String),
    ("lat", FieldType::Number),
    ("lon", FieldType::Number),
    ("seats", FieldType::Number),
    ("type", FieldType::String),
    ("furniture", FieldType::String),
    ("href", FieldType::String),
];

/// Kind of dataset, which fixes its row schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Course sections
    Sections,
    /// Campus rooms
    Rooms,
}

impl DatasetKind {
    /// Returns the kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Sections => "sections",
            DatasetKind::Rooms => "rooms",
        }
    }

    /// Returns every field of this kind with its type, in declaration order
    pub fn fields(&self) -> &'static [(&'static str, FieldType)] {
        match self {
            DatasetKind::Sections => SECTIONS_FIELDS,
            DatasetKind::Rooms => ROOMS_FIELDS,
        }
    }

    /// Returns the type of a field, or None if the field does not exist for this kind
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields()
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, ty)| *ty)
    }

    /// Names of the numeric fields
    pub fn numeric_fields(&self) -> Vec<&'static str> {
        self.fields_of(FieldType::Number)
    }

    /// Names of the string fields
    pub fn string_fields(&self) -> Vec<&'static str> {
        self.fields_of(FieldType::String)
    }

    fn fields_of(&self, wanted: FieldType) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|(_, ty)| *ty == wanted)
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Checks the dataset id rules: non-blank and no underscore
pub fn is_valid_dataset_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains('_')
}

/// An immutable, fully materialized dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: String,
    kind: DatasetKind,
    rows: Vec<Row>,
}

impl Dataset {
    /// Creates a dataset, checking the id and the shape of every row.
    ///
    /// Each row must hold exactly the fields of `kind`, each with the declared type.
    pub fn new(id: impl Into<String>, kind: DatasetKind, rows: Vec<Row>) -> DatasetResult<Self> {
        let id = id.into();
        if !is_valid_dataset_id(&id) {
            return Err(DatasetError::invalid_id(id));
        }

        for (index, row) in rows.iter().enumerate() {
            Self::check_row(&id, kind, index, row)?;
        }

        Ok(Self { id, kind, rows })
    }

    fn check_row(id: &str, kind: DatasetKind, index: usize, row: &Row) -> DatasetResult<()> {
        for key in row.keys() {
            if kind.field_type(key).is_none() {
                return Err(DatasetError::malformed_row(
                    id,
                    index,
                    format!("undeclared field '{}' for {} dataset", key, kind.as_str()),
                ));
            }
        }

        for (field, ty) in kind.fields() {
            match row.get(*field) {
                Some(value) if ty.accepts(value) => {}
                Some(_) => {
                    return Err(DatasetError::malformed_row(
                        id,
                        index,
                        format!("field '{}' must be a {}", field, ty.type_name()),
                    ));
                }
                None => {
                    return Err(DatasetError::malformed_row(
                        id,
                        index,
                        format!("missing field '{}'", field),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Returns the dataset id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the dataset kind
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Returns the rows in ingestion order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Summary used for dataset listings
    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            id: self.id.clone(),
            kind: self.kind,
            num_rows: self.rows.len(),
        }
    }
}

/// Dataset listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset id
    pub id: String,
    /// Dataset kind
    pub kind: DatasetKind,
    /// Number of rows
    #[serde(rename = "numRows")]
    pub num_rows: usize,
}
