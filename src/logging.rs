/// Tracing subscriber setup.
///
/// The terminal belongs to the renderer, so log lines go to a file.
/// `RUST_LOG` overrides the level from `config.toml`.

use std::fs::File;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::domain::error::AppError;

pub fn init(cfg: &LogConfig) -> Result<(), AppError> {
    let file = File::create(&cfg.file)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .map_err(|e| AppError::Log(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Log(e.to_string()))
}
