mod app;
mod cli;
mod event;
mod terminal;
mod ui;

use app::App;
use clap::Parser;
use cli::CliArgs;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use crop_forecast_viewer::config::init_app_config;
use crop_forecast_viewer::data::DatasetStore;
use crop_forecast_viewer::logging::{init_logging, LogTarget};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = init_app_config();

    let headless = args.headless || !is_terminal();
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    let _log_guard = init_logging(target, &config.log_dir, config.debug);
    info!(data = ?config.data, headless, "starting crop forecast viewer");

    // Nothing can be shown without the tables, so a failed load ends the run
    let mut store = DatasetStore::new();
    let dataset = match store.load(&config.data).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(path = %e.path().display(), "failed to load dataset: {e}");
            return Err(e).wrap_err("Failed to load the input data");
        }
    };

    let mut app = App::new(config.data, store, dataset);

    if headless {
        return event::run_headless(&mut app, args.json, args.region.as_deref());
    }

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup(true, true);

    info!("viewer closed");
    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
