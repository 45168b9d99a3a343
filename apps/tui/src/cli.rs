use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "crop_forecast_viewer",
    version,
    about = "Sub-Saharan Africa crop yield and forecast viewer"
)]
pub struct CliArgs {
    /// Print a data summary and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Directory holding the input tables and geometries
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Directory for rolling log files
    #[arg(long = "log-dir", value_name = "PATH")]
    pub log_dir: Option<String>,

    /// Add the yield & climate view of one region to the headless report
    #[arg(long, value_name = "FNID")]
    pub region: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(dir) = &self.data_dir {
            std::env::set_var("DATA_DIR", dir);
        }
        if let Some(dir) = &self.log_dir {
            std::env::set_var("LOG_DIR", dir);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }
}
