//! Tracing subscriber initialisation
//!
//! `RUST_LOG` wins over the configured level when set.

use session_shared::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, EnvFilter};

use crate::InfrastructureError;

/// Build the env filter from `RUST_LOG`, falling back to `config.level`
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, InfrastructureError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            InfrastructureError::Config(format!("Invalid log level '{}': {}", config.level, e))
        }),
    }
}

/// Install the global tracing subscriber
pub fn init(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = env_filter(config)?;
    let builder = fmt()
        .with_env_filter(filter)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| InfrastructureError::General(format!("Failed to install tracing subscriber: {}", e)))
}
