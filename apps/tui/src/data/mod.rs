pub mod dataset;
pub mod error;
pub mod geopackage;
pub mod loader;
pub mod models;
pub mod parquet;
pub mod store;
pub mod wkb;

#[cfg(test)]
pub mod test_data;

pub use dataset::{Dataset, DatasetSummary};
pub use error::DataError;
pub use loader::load_dataset;
pub use models::{EoObservation, ForecastRecord, MapFeature, Region, YieldObservation};
pub use store::DatasetStore;
