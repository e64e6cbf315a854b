//! Tracing setup
//!
//! Diagnostics go to stderr so stdout stays free for command output and the
//! engine's teed stream.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Configuration for logging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive (e.g. "info", "infrastructure=debug"). When unset the
    /// level follows the `-v` count.
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Error type for tracing initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Level directive for a `-v` count
pub const fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `RUST_LOG` wins, then the configured filter, then the
/// verbosity level
fn build_filter(verbosity: u8, config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .log_filter
            .as_deref()
            .map_or_else(|| EnvFilter::new(level_for_verbosity(verbosity)), EnvFilter::new)
    })
}

/// Install the global subscriber
pub fn init_tracing(verbosity: u8, config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(verbosity, config);

    let result = match config.log_format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 2);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        },
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        },
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))
}
