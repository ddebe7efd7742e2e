//! In-memory dataset registry
//!
//! Holds every loaded dataset by id in registration order. Datasets are
//! shared as `Arc` snapshots so queries never observe a partially
//! replaced dataset.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;

use super::errors::{DatasetError, DatasetResult};
use super::types::{is_valid_dataset_id, Dataset, DatasetInfo, DatasetKind};

/// Read-only view of the registered datasets used by query validation
pub trait DatasetCatalog {
    /// Returns the kind of the dataset with the given id, if registered
    fn dataset_kind(&self, id: &str) -> Option<DatasetKind>;
}

/// Registry of loaded datasets
#[derive(Debug, Default, Clone)]
pub struct DatasetRegistry {
    datasets: IndexMap<String, Arc<Dataset>>,
}

impl DatasetRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dataset and returns the ids of all registered datasets.
    ///
    /// Rejects duplicate ids; id and row shape were checked by `Dataset::new`.
    pub fn add(&mut self, dataset: Dataset) -> DatasetResult<Vec<String>> {
        if self.datasets.contains_key(dataset.id()) {
            return Err(DatasetError::duplicate(dataset.id()));
        }

        info!(
            dataset_id = dataset.id(),
            kind = dataset.kind().as_str(),
            rows = dataset.len(),
            "dataset registered"
        );
        self.datasets
            .insert(dataset.id().to_string(), Arc::new(dataset));

        Ok(self.ids())
    }

    /// Removes a dataset by id and returns the removed id
    pub fn remove(&mut self, id: &str) -> DatasetResult<String> {
        if !is_valid_dataset_id(id) {
            return Err(DatasetError::invalid_id(id));
        }

        match self.datasets.shift_remove(id) {
            Some(_) => {
                info!(dataset_id = id, "dataset removed");
                Ok(id.to_string())
            }
            None => Err(DatasetError::not_found(id)),
        }
    }

    /// Returns a shared handle to a dataset
    pub fn get(&self, id: &str) -> Option<Arc<Dataset>> {
        self.datasets.get(id).cloned()
    }

    /// Returns the registered ids in registration order
    pub fn ids(&self) -> Vec<String> {
        self.datasets.keys().cloned().collect()
    }

    /// Lists every dataset in registration order
    pub fn list(&self) -> Vec<DatasetInfo> {
        self.datasets.values().map(|ds| ds.info()).collect()
    }

    /// Returns the number of registered datasets
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Returns true if no dataset is registered
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl DatasetCatalog for DatasetRegistry {
    fn dataset_kind(&self, id: &str) -> Option<DatasetKind> {
        self.datasets.get(id).map(|ds| ds.kind())
    }
}
