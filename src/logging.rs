use crate::config::Config;
use color_eyre::Result;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// The terminal belongs to the TUI, so events go to an append-only file
/// in the data directory. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &Config) -> Result<PathBuf> {
    let data_dir = config.data_dir()?;
    fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join(&config.logging.file);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| color_eyre::eyre::eyre!("Failed to install logger: {}", error))?;

    Ok(log_path)
}
