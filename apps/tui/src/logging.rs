// Logging setup.
// The TUI owns stdout, so interactive sessions log to a rolling file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

pub const LOG_FILE_PREFIX: &str = "crop-forecast-viewer.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Daily rolling file inside the log directory
    File,
    /// stderr, used by headless runs
    Stderr,
}

/// `RUST_LOG` wins; otherwise `debug` when requested, else `info`.
pub fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process. Installing twice is a no-op.
pub fn init_logging(target: LogTarget, log_dir: &Path, debug: bool) -> Option<WorkerGuard> {
    let registry = Registry::default().with(env_filter(debug));

    match target {
        LogTarget::File => {
            if let Err(e) = std::fs::create_dir_all(log_dir) {
                eprintln!("Warning: Failed to create log directory {}: {e}", log_dir.display());
                return None;
            }
            let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            if registry.with(layer).try_init().is_err() {
                return None;
            }
            Some(guard)
        }
        LogTarget::Stderr => {
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = registry.with(layer).try_init();
            None
        }
    }
}
