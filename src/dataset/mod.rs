//! Dataset subsystem for insightql
//!
//! Datasets are produced by the external ingestion pipeline and handed to
//! the engine fully materialized. Once registered they are immutable.
//!
//! # Rules
//!
//! - Dataset ids are non-blank and never contain `_`
//! - Every row holds exactly the fields of its kind, with the declared types
//! - Queries read datasets through shared snapshots and never mutate them

mod errors;
mod loader;
mod registry;
mod types;

pub use errors::{DatasetError, DatasetErrorCode, DatasetResult};
pub use loader::DatasetLoader;
pub use registry::{DatasetCatalog, DatasetRegistry};
pub use types::{is_valid_dataset_id, Dataset, DatasetInfo, DatasetKind, FieldType, Row};
