#[allow(clippy::module_inception)]
mod config;

pub use config::{get_log_dir, init_app_config, is_debug, AppConfig, DataPaths};
