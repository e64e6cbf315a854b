//! Status reporting
//!
//! Read-only view of both supervised services.

use std::sync::Arc;
use std::time::Duration;

use domain::{ProcessId, ServiceSettings};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{instrument, warn};

use crate::ports::{EngineHealthPort, PortProbePort, ProcessRecordStore, ProcessTablePort};

/// Default timeout for the engine health request
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

/// Recorded asset server and whether it still runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordStatus {
    pub pid: ProcessId,
    pub alive: bool,
    /// `false` when the id is alive but belongs to a different process
    pub identity_matches: bool,
}

/// Asset server part of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetServerReport {
    pub url: String,
    pub listening: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordStatus>,
    /// Set when the record file exists but cannot be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_error: Option<String>,
}

/// Engine part of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub base_url: String,
    pub pids: Vec<ProcessId>,
    /// `None` when no health check was configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,
}

/// Combined report
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub asset_server: AssetServerReport,
    pub engine: EngineReport,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl StatusReport {
    /// Both services look up
    pub fn all_running(&self) -> bool {
        self.asset_server.listening
            && !self.engine.pids.is_empty()
            && self.engine.healthy.unwrap_or(true)
    }
}

/// Service building status reports
pub struct StatusService {
    settings: Arc<ServiceSettings>,
    probe: Arc<dyn PortProbePort>,
    table: Arc<dyn ProcessTablePort>,
    records: Arc<dyn ProcessRecordStore>,
    health: Option<Arc<dyn EngineHealthPort>>,
    health_timeout: Duration,
}

impl std::fmt::Debug for StatusService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusService")
            .field("health", &self.health.is_some())
            .field("health_timeout", &self.health_timeout)
            .finish_non_exhaustive()
    }
}

impl StatusService {
    #[must_use]
    pub fn new(
        settings: Arc<ServiceSettings>,
        probe: Arc<dyn PortProbePort>,
        table: Arc<dyn ProcessTablePort>,
        records: Arc<dyn ProcessRecordStore>,
    ) -> Self {
        Self {
            settings,
            probe,
            table,
            records,
            health: None,
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }

    /// Add an engine health check
    #[must_use]
    pub fn with_health(mut self, health: Arc<dyn EngineHealthPort>) -> Self {
        self.health = Some(health);
        self
    }

    /// Override the health check timeout
    #[must_use]
    pub const fn with_health_timeout(mut self, health_timeout: Duration) -> Self {
        self.health_timeout = health_timeout;
        self
    }

    #[instrument(skip(self))]
    pub async fn report(&self) -> StatusReport {
        StatusReport {
            asset_server: self.asset_server_report().await,
            engine: self.engine_report().await,
            checked_at: chrono::Utc::now(),
        }
    }

    async fn asset_server_report(&self) -> AssetServerReport {
        let asset = &self.settings.asset_server;
        let listening = self.probe.is_listening(asset.connect_host(), asset.port).await;

        let (record, record_error) = match self.records.load().await {
            Ok(Some(record)) => {
                let info = self.table.inspect(record.pid).await;
                let status = RecordStatus {
                    pid: record.pid,
                    alive: info.is_some(),
                    identity_matches: info
                        .is_some_and(|i| record.is_same_process(i.start_time)),
                };
                (Some(status), None)
            },
            Ok(None) => (None, None),
            Err(e) => (None, Some(e.to_string())),
        };

        AssetServerReport {
            url: asset.url(),
            listening,
            record,
            record_error,
        }
    }

    async fn engine_report(&self) -> EngineReport {
        let pids = self
            .table
            .find_matching(&self.settings.engine.match_pattern)
            .await
            .into_iter()
            .filter(|pid| *pid != ProcessId::current())
            .collect();

        let healthy = match &self.health {
            Some(health) => {
                if let Ok(ok) = timeout(self.health_timeout, health.is_healthy()).await {
                    Some(ok)
                } else {
                    warn!("Engine health check timed out");
                    Some(false)
                }
            },
            None => None,
        };

        EngineReport {
            base_url: self.settings.engine.base_url(),
            pids,
            healthy,
        }
    }
}
