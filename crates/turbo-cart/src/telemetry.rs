//! Tracing subscriber setup for hosts embedding the cart.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

#[derive(Error, Debug)]
#[error("Failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Build the filter: `RUST_LOG` when set, `config.filter` otherwise.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install a global subscriber formatted per `config.format`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config);
    let result = match config.format {
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .try_init(),
    };
    result.map_err(|e| TelemetryError(e.to_string()))
}
