use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LOG_DIR: &str = "./logs";

pub const DEFAULT_EO_FILE: &str = "cape_eo_formatted.parquet";
pub const DEFAULT_YIELD_FILE: &str = "viewer_yield.parquet";
pub const DEFAULT_FORECAST_FILE: &str = "viewer_yield_fcst_error.parquet";
pub const DEFAULT_REGIONS_FILE: &str = "gscd_shape_simplified.gpkg";
pub const DEFAULT_BOUNDARIES_FILE: &str = "gscd_shape.geojson";

/// Locations of the read-only input files.
///
/// Two equal `DataPaths` always resolve to the same memoized dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataPaths {
    pub eo: PathBuf,
    pub yields: PathBuf,
    pub forecasts: PathBuf,
    pub regions: PathBuf,
    pub boundaries: PathBuf,
}

impl DataPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            eo: dir.join(DEFAULT_EO_FILE),
            yields: dir.join(DEFAULT_YIELD_FILE),
            forecasts: dir.join(DEFAULT_FORECAST_FILE),
            regions: dir.join(DEFAULT_REGIONS_FILE),
            boundaries: dir.join(DEFAULT_BOUNDARIES_FILE),
        }
    }

    /// Resolve paths from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        let dir = PathBuf::from(env_or("DATA_DIR", DEFAULT_DATA_DIR));
        Self {
            eo: dir.join(env_or("EO_FILE", DEFAULT_EO_FILE)),
            yields: dir.join(env_or("YIELD_FILE", DEFAULT_YIELD_FILE)),
            forecasts: dir.join(env_or("FORECAST_FILE", DEFAULT_FORECAST_FILE)),
            regions: dir.join(env_or("REGIONS_FILE", DEFAULT_REGIONS_FILE)),
            boundaries: dir.join(env_or("BOUNDARIES_FILE", DEFAULT_BOUNDARIES_FILE)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data: DataPaths,
    pub log_dir: PathBuf,
    pub debug: bool,
}

/// Initializes the application configuration from `.env` and the process environment
pub fn init_app_config() -> AppConfig {
    // Load environment variables from .env file
    dotenv().ok();

    AppConfig {
        data: DataPaths::from_env(),
        log_dir: get_log_dir(),
        debug: is_debug(),
    }
}

/// Gets the directory for rolling log files
pub fn get_log_dir() -> PathBuf {
    env::var("LOG_DIR").map_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from)
}

pub fn is_debug() -> bool {
    env::var("DEBUG").is_ok_and(|value| !value.is_empty() && value != "0")
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
