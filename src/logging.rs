//! Logging System
//!
//! Structured logging using the `tracing` crate. Events are written to
//! stderr so that stdout carries only the JSON document printed by `config`.
//! The library emits events; only the binary installs a subscriber.

use std::io::IsTerminal;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive string. When set
/// and valid it overrides the configured level.
pub const LOG_ENV_VAR: &str = "RKT_CONFIG_LOG";

/// Output format for log events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive: a level (`warn`, `debug`, ...) or module-level
    /// directives such as `rkt_config=debug`
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Configuration for the CLI's `--debug` and `--log-format` flags.
    pub fn from_flags(debug: bool, format: LogFormat) -> Self {
        Self {
            level: if debug { "debug" } else { "warn" }.to_string(),
            format,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("failed to install log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. `RKT_CONFIG_LOG`
/// 2. The configured level
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }
    parse_filter(&config.level)
}

fn parse_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidFilter {
        filter: directives.to_string(),
        reason: e.to_string(),
    })
}
