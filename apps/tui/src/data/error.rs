use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the input files. There is no partial load.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed Parquet file {path}: {source}")]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("unreadable column in {path}: {source}")]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow_schema::ArrowError,
    },

    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{path}: row {row} has no value for `{column}`")]
    MissingValue {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },

    #[error("malformed GeoJSON {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: expected a FeatureCollection")]
    NotAFeatureCollection { path: PathBuf },

    #[error("failed to query GeoPackage {path}: {source}")]
    GeoPackage {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("{path}: no feature table is registered in gpkg_geometry_columns")]
    NoGeometryLayer { path: PathBuf },

    #[error("{path}: feature {index} is missing property `{property}`")]
    MissingProperty {
        path: PathBuf,
        index: usize,
        property: &'static str,
    },

    #[error("{path}: feature {index} ({fnid}) has no usable polygon geometry")]
    InvalidGeometry {
        path: PathBuf,
        index: usize,
        fnid: String,
    },
}

impl DataError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. }
            | Self::Csv { path, .. }
            | Self::Parquet { path, .. }
            | Self::Arrow { path, .. }
            | Self::MissingColumn { path, .. }
            | Self::MissingValue { path, .. }
            | Self::GeoJson { path, .. }
            | Self::NotAFeatureCollection { path }
            | Self::GeoPackage { path, .. }
            | Self::NoGeometryLayer { path }
            | Self::MissingProperty { path, .. }
            | Self::InvalidGeometry { path, .. } => path,
        }
    }
}
