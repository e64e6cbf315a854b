//! The complete configuration set for one launcher/terminator pair

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AssetServerSettings, CommandSpec, EngineSettings, LifecycleTimings};
use crate::errors::DomainError;

/// Immutable settings shared by all lifecycle services
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub asset_server: AssetServerSettings,

    #[serde(default)]
    pub timings: LifecycleTimings,

    /// Advisory lock serializing check-and-spawn against concurrent runs
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
}

fn default_lock_file() -> PathBuf {
    PathBuf::from("run/omni-serve.lock")
}

impl ServiceSettings {
    /// Directory the engine may read local media from
    pub fn media_path(&self) -> &Path {
        self.engine
            .allowed_local_media_path
            .as_deref()
            .unwrap_or(&self.asset_server.directory)
    }

    /// Engine arguments with the media path resolved
    pub fn engine_args(&self) -> Vec<String> {
        self.engine.command_args(self.media_path())
    }

    /// Unresolved engine command; the runtime resolver fills in the
    /// executable path and environment
    pub fn engine_command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.engine.program, self.engine_args());
        for (key, value) in &self.engine.env {
            spec = spec.with_env(key, value);
        }
        spec
    }

    /// Asset server command
    pub fn asset_server_command(&self) -> Result<CommandSpec, DomainError> {
        Ok(CommandSpec::new(
            &self.asset_server.program,
            self.asset_server.render_args()?,
        ))
    }
}
