pub mod forecasts;
pub mod help;
pub mod regions;
