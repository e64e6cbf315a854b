//! Wiring of adapters into services

use std::sync::Arc;
use std::time::Duration;

use ai_core::{ClientConfig, InferenceError, OmniClient};
use application::{LauncherService, StatusService, TerminatorService};
use domain::ServiceSettings;
use infrastructure::{
    AppConfig, EngineHealthAdapter, FileLifecycleLock, FileRecordStore, FsDirectories,
    PathRuntimeResolver, SysinfoProcessTable, TcpPortProbe, TokioProcessLauncher,
};
use tracing::warn;

/// Shared adapters built once per invocation
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    settings: Arc<ServiceSettings>,
    table: Arc<SysinfoProcessTable>,
    records: Arc<FileRecordStore>,
    lock: Arc<FileLifecycleLock>,
    probe: Arc<TcpPortProbe>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let settings = Arc::new(config.service_settings());
        Self {
            table: Arc::new(SysinfoProcessTable::new()),
            records: Arc::new(FileRecordStore::new(&settings.asset_server.record_file)),
            lock: Arc::new(FileLifecycleLock::new(&settings.lock_file)),
            probe: Arc::new(TcpPortProbe::new(settings.timings.probe_timeout())),
            settings,
            config,
        }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn launcher(&self) -> LauncherService {
        let launcher = TokioProcessLauncher::new().with_identity(self.table.clone());
        LauncherService::new(
            Arc::clone(&self.settings),
            Arc::new(PathRuntimeResolver::new(self.settings.engine.runtime_dir.clone())),
            self.probe.clone(),
            self.records.clone(),
            Arc::new(launcher),
            Arc::new(FsDirectories),
            self.lock.clone(),
        )
    }

    pub fn terminator(&self) -> TerminatorService {
        TerminatorService::new(
            Arc::clone(&self.settings),
            self.table.clone(),
            self.records.clone(),
            self.lock.clone(),
        )
    }

    pub fn status(&self) -> StatusService {
        let service = StatusService::new(
            Arc::clone(&self.settings),
            self.probe.clone(),
            self.table.clone(),
            self.records.clone(),
        );

        match self.client(None, false) {
            Ok(client) => service
                .with_health_timeout(Duration::from_millis(self.config.client.health_timeout_ms))
                .with_health(Arc::new(EngineHealthAdapter::new(Arc::new(client)))),
            Err(e) => {
                warn!(error = %e, "Engine health check unavailable");
                service
            },
        }
    }

    /// Engine client; `base_url` overrides the configured address
    pub fn client(
        &self,
        base_url: Option<&str>,
        keep_reasoning: bool,
    ) -> Result<OmniClient, InferenceError> {
        let mut config: ClientConfig = self.config.client.clone();
        if let Some(url) = base_url {
            config.base_url = Some(url.to_string());
        }
        if keep_reasoning {
            config.strip_reasoning = false;
        }
        OmniClient::new(config, &self.settings.engine.base_url())
    }
}
