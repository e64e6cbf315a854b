//! Service launcher
//!
//! Brings the asset server and the inference engine up:
//!
//! 1. resolve the engine command inside its runtime environment (fatal on
//!    failure, before anything is spawned)
//! 2. under the lifecycle lock, reuse an asset server already listening on
//!    the configured port or spawn and record a new one
//! 3. run the engine in the foreground and hand back its exit code

use std::path::Path;
use std::sync::Arc;

use domain::{CommandSpec, ProcessRecord, ServiceSettings};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{
    DirectoryPort, EngineRuntimePort, LifecycleLockPort, PortProbePort, ProcessLauncherPort,
    ProcessRecordStore,
};

/// What the launcher did about the asset server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssetServerStatus {
    /// Something was already listening; it was left alone
    Reused { url: String },
    /// A new server was spawned and recorded
    Started {
        url: String,
        record: ProcessRecord,
        /// Whether the port answered after the settle delay
        confirmed: bool,
    },
}

impl AssetServerStatus {
    pub fn url(&self) -> &str {
        match self {
            Self::Reused { url } | Self::Started { url, .. } => url,
        }
    }

    pub const fn was_spawned(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

/// Launch state between asset-server setup and the engine run
#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    /// Fully resolved engine invocation
    pub engine: CommandSpec,
    pub asset_server: AssetServerStatus,
}

/// Orchestrates startup of both services
pub struct LauncherService {
    settings: Arc<ServiceSettings>,
    runtime: Arc<dyn EngineRuntimePort>,
    probe: Arc<dyn PortProbePort>,
    records: Arc<dyn ProcessRecordStore>,
    processes: Arc<dyn ProcessLauncherPort>,
    directories: Arc<dyn DirectoryPort>,
    lock: Arc<dyn LifecycleLockPort>,
}

impl std::fmt::Debug for LauncherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LauncherService")
            .field("engine_port", &self.settings.engine.port)
            .field("asset_port", &self.settings.asset_server.port)
            .finish_non_exhaustive()
    }
}

impl LauncherService {
    #[must_use]
    pub fn new(
        settings: Arc<ServiceSettings>,
        runtime: Arc<dyn EngineRuntimePort>,
        probe: Arc<dyn PortProbePort>,
        records: Arc<dyn ProcessRecordStore>,
        processes: Arc<dyn ProcessLauncherPort>,
        directories: Arc<dyn DirectoryPort>,
        lock: Arc<dyn LifecycleLockPort>,
    ) -> Self {
        Self {
            settings,
            runtime,
            probe,
            records,
            processes,
            directories,
            lock,
        }
    }

    /// Settings this launcher was built with
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Resolve the engine command and make sure the asset server is up
    #[instrument(skip(self))]
    pub async fn prepare(&self) -> Result<PreparedLaunch, ApplicationError> {
        let engine = self.runtime.resolve(self.settings.engine_command())?;
        debug!(command = %engine, "Engine command resolved");

        let asset_server = self.ensure_asset_server().await?;

        Ok(PreparedLaunch {
            engine,
            asset_server,
        })
    }

    /// Run the engine in the foreground; returns its exit code
    #[instrument(skip(self, prepared))]
    pub async fn run_engine(&self, prepared: &PreparedLaunch) -> Result<i32, ApplicationError> {
        let log_file = &self.settings.engine.log_file;
        self.ensure_parent_dir(log_file).await?;

        info!(
            command = %prepared.engine,
            log_file = %log_file.display(),
            "Starting inference engine"
        );

        let code = self
            .processes
            .run_foreground(&prepared.engine, log_file)
            .await?;

        if code == 0 {
            info!("Inference engine exited cleanly");
        } else {
            warn!(exit_code = code, "Inference engine exited with failure");
        }
        Ok(code)
    }

    /// Reuse or start the asset server while holding the lifecycle lock
    #[instrument(skip(self))]
    pub async fn ensure_asset_server(&self) -> Result<AssetServerStatus, ApplicationError> {
        let asset = &self.settings.asset_server;
        let url = asset.url();

        let _guard = self.lock.acquire().await?;

        if self.probe.is_listening(asset.connect_host(), asset.port).await {
            info!(url = %url, "Asset server already listening, reusing it");
            return Ok(AssetServerStatus::Reused { url });
        }

        let command = self
            .settings
            .asset_server_command()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

        if self.directories.ensure_dir(&asset.directory).await? {
            info!(directory = %asset.directory.display(), "Created asset directory");
        }
        self.ensure_parent_dir(&asset.log_file).await?;

        let record = self
            .processes
            .spawn_detached(&command, &asset.log_file)
            .await?;
        info!(pid = %record.pid, command = %command, "Asset server spawned");

        self.records.save(&record).await?;

        tokio::time::sleep(self.settings.timings.settle_delay()).await;

        let confirmed = self.probe.is_listening(asset.connect_host(), asset.port).await;
        if confirmed {
            info!(url = %url, "Asset server is up");
        } else {
            warn!(
                url = %url,
                log_file = %asset.log_file.display(),
                "Asset server did not answer after settle delay, continuing"
            );
        }

        Ok(AssetServerStatus::Started {
            url,
            record,
            confirmed,
        })
    }

    async fn ensure_parent_dir(&self, file: &Path) -> Result<(), ApplicationError> {
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.directories.ensure_dir(parent).await?;
        }
        Ok(())
    }
}
