//! Application configuration
//!
//! Layered with the `config` crate:
//! - serde defaults on every field
//! - optional TOML file (`omni-serve.toml`, or an explicit path)
//! - environment variables, e.g. `OMNI_SERVE_ENGINE__PORT=8003`
//!
//! The configuration is read once at startup and never mutated.

use std::path::{Path, PathBuf};

use ai_core::ClientConfig;
use domain::{AssetServerSettings, EngineSettings, LifecycleTimings, ServiceSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::TelemetryConfig;

/// Prefix of configuration environment variables
pub const CONFIG_ENV_PREFIX: &str = "OMNI_SERVE";

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_NAME: &str = "omni-serve";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inference engine
    #[serde(default)]
    pub engine: EngineSettings,

    /// Static asset server
    #[serde(default)]
    pub asset_server: AssetServerSettings,

    /// Settle and grace delays
    #[serde(default)]
    pub timings: LifecycleTimings,

    /// Advisory lock file
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,

    /// Engine client used by `ask` and the health check
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_lock_file() -> PathBuf {
    ServiceSettings::default().lock_file
}

impl AppConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., OMNI_SERVE_ENGINE__PORT)
            .add_source(
                config::Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(
            engine_port = config.engine.port,
            asset_port = config.asset_server.port,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Settings shared by the lifecycle services
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            engine: self.engine.clone(),
            asset_server: self.asset_server.clone(),
            timings: self.timings,
            lock_file: self.lock_file.clone(),
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
