//! Tracing subscriber setup for binaries embedding the engine.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the application, which can call [`init_tracing`] with the
//! [`LoggingConfig`] it loaded.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{SimError, SimResult};

/// Build the level filter: `RUST_LOG` wins when set, otherwise the
/// configured level.
pub fn env_filter(config: &LoggingConfig) -> SimResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| SimError::Configuration(format!("Invalid log level: {e}")))
}

/// Install the global subscriber.
///
/// Fails if the level is malformed or a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> SimResult<()> {
    let filter = env_filter(config)?;

    let fmt_layer = match config.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| SimError::Configuration(format!("Tracing already initialized: {e}")))?;

    tracing::debug!(format = %config.format, level = %config.level, "tracing initialized");
    Ok(())
}
