use crate::config::DataPaths;
use crate::data::dataset::Dataset;
use crate::data::error::DataError;
use crate::data::loader::load_dataset;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads each set of input files once and hands out shared, read-only copies.
#[derive(Debug, Default)]
pub struct DatasetStore {
    loaded: HashMap<DataPaths, Arc<Dataset>>,
    loads: usize,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized dataset for `paths`, reading the files on first use.
    pub async fn load(&mut self, paths: &DataPaths) -> Result<Arc<Dataset>, DataError> {
        if let Some(dataset) = self.loaded.get(paths) {
            debug!("dataset served from memory");
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_dataset(paths).await?);
        self.loads += 1;
        self.loaded.insert(paths.clone(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget the dataset for `paths`; the next `load` reads the files again.
    pub fn invalidate(&mut self, paths: &DataPaths) -> bool {
        let removed = self.loaded.remove(paths).is_some();
        if removed {
            info!("dataset invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
    }

    /// Number of times files were actually read
    pub const fn load_count(&self) -> usize {
        self.loads
    }
}
