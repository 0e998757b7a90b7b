//! Event log setup
//!
//! Events go to `debug.log` in the data directory. The subscriber is
//! installed once per process; later calls are no-ops.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nexa_core::Settings;

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. With `verbose`, events are
/// mirrored to stderr.
pub fn init(data_dir: &Path, settings: &Settings, verbose: bool) -> Result<()> {
    let log_path = data_dir.join(&settings.log_file);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr));

    // Already initialised (tests, repeated calls) is not an error
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    Ok(())
}
