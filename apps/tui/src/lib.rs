// Export our modules for use in the binary and tests
pub mod config;
pub mod data;
pub mod domain;
pub mod filter;
pub mod logging;
pub mod render;
pub mod selector;
pub mod session;

pub use domain::{EoVariable, ForecastMetric, Page};
