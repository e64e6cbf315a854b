//! Service terminator
//!
//! Stops the asset server and the inference engine. Every step tolerates
//! missing state; stopping when nothing runs is a successful no-op.

use std::sync::Arc;
use std::time::Instant;

use domain::{ProcessId, ServiceSettings};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{LifecycleLockPort, ProcessRecordStore, ProcessTablePort, TerminationSignal};

/// Poll interval while waiting for force-killed processes to vanish
const KILL_POLL_INTERVAL_MS: u64 = 100;

/// What happened to the recorded asset server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// No record existed
    Absent,
    /// The recorded process was alive and has been signalled
    Signalled { pid: ProcessId },
    /// The recorded process had already exited
    NotRunning { pid: ProcessId },
    /// The id now belongs to a different process; it was left alone
    Stale { pid: ProcessId },
    /// The record could not be read and was discarded
    Unreadable,
}

/// What happened to the inference engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EngineStopOutcome {
    /// No matching process was found
    NothingRunning,
    /// Matching processes were stopped
    Stopped {
        /// Processes sent the graceful signal
        signalled: Vec<ProcessId>,
        /// Survivors of the grace period that were force-killed
        forced: Vec<ProcessId>,
        /// Processes still present after the forced kill
        remaining: Vec<ProcessId>,
    },
}

/// Summary of a stop run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopReport {
    pub asset_record: RecordOutcome,
    /// Processes force-killed for holding the asset port
    pub port_holders_killed: Vec<ProcessId>,
    pub engine: EngineStopOutcome,
}

impl StopReport {
    /// Whether anything at all was running
    pub fn stopped_anything(&self) -> bool {
        matches!(self.asset_record, RecordOutcome::Signalled { .. })
            || !self.port_holders_killed.is_empty()
            || matches!(self.engine, EngineStopOutcome::Stopped { .. })
    }

    /// Whether every matched engine process is gone
    pub fn engine_fully_stopped(&self) -> bool {
        match &self.engine {
            EngineStopOutcome::NothingRunning => true,
            EngineStopOutcome::Stopped { remaining, .. } => remaining.is_empty(),
        }
    }
}

/// Orchestrates shutdown of both services
pub struct TerminatorService {
    settings: Arc<ServiceSettings>,
    table: Arc<dyn ProcessTablePort>,
    records: Arc<dyn ProcessRecordStore>,
    lock: Arc<dyn LifecycleLockPort>,
}

impl std::fmt::Debug for TerminatorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminatorService")
            .field("pattern", &self.settings.engine.match_pattern)
            .field("asset_port", &self.settings.asset_server.port)
            .finish_non_exhaustive()
    }
}

impl TerminatorService {
    #[must_use]
    pub fn new(
        settings: Arc<ServiceSettings>,
        table: Arc<dyn ProcessTablePort>,
        records: Arc<dyn ProcessRecordStore>,
        lock: Arc<dyn LifecycleLockPort>,
    ) -> Self {
        Self {
            settings,
            table,
            records,
            lock,
        }
    }

    /// Stop the asset server, then the engine
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<StopReport, ApplicationError> {
        let (asset_record, port_holders_killed) = {
            let _guard = self.lock.acquire().await?;
            let asset_record = self.stop_recorded_asset_server().await;
            let killed = self.kill_port_holders().await;
            (asset_record, killed)
        };

        let engine = self.stop_engine().await;

        Ok(StopReport {
            asset_record,
            port_holders_killed,
            engine,
        })
    }

    /// Signal the recorded asset server and discard the record
    #[instrument(skip(self))]
    pub async fn stop_recorded_asset_server(&self) -> RecordOutcome {
        let outcome = match self.records.load().await {
            Ok(None) => return RecordOutcome::Absent,
            Ok(Some(record)) => match self.table.inspect(record.pid).await {
                Some(info) if record.is_same_process(info.start_time) => {
                    match self
                        .table
                        .signal(record.pid, TerminationSignal::Graceful)
                        .await
                    {
                        Ok(_) => info!(pid = %record.pid, "Asset server signalled"),
                        Err(e) => warn!(pid = %record.pid, error = %e, "Failed to signal asset server"),
                    }
                    RecordOutcome::Signalled { pid: record.pid }
                },
                Some(info) => {
                    warn!(
                        pid = %record.pid,
                        recorded_start = ?record.start_time,
                        observed_start = info.start_time,
                        "Recorded process id was reused, not signalling"
                    );
                    RecordOutcome::Stale { pid: record.pid }
                },
                None => {
                    debug!(pid = %record.pid, "Recorded asset server is not running");
                    RecordOutcome::NotRunning { pid: record.pid }
                },
            },
            Err(e) => {
                warn!(error = %e, "Discarding unreadable asset server record");
                RecordOutcome::Unreadable
            },
        };

        if let Err(e) = self.records.remove().await {
            warn!(error = %e, "Failed to remove asset server record");
        }
        outcome
    }

    /// Force-kill whatever listens on the asset port
    #[instrument(skip(self))]
    pub async fn kill_port_holders(&self) -> Vec<ProcessId> {
        let port = self.settings.asset_server.port;
        let own = ProcessId::current();
        let mut killed = Vec::new();

        for pid in self.table.listeners_on_port(port).await {
            if pid == own {
                continue;
            }
            match self.table.signal(pid, TerminationSignal::Forced).await {
                Ok(true) => {
                    info!(pid = %pid, port, "Killed asset port holder");
                    killed.push(pid);
                },
                Ok(false) => debug!(pid = %pid, "Port holder already gone"),
                Err(e) => warn!(pid = %pid, error = %e, "Failed to kill port holder"),
            }
        }
        killed
    }

    /// Graceful signal, grace period, forced kill for matching engine processes
    #[instrument(skip(self))]
    pub async fn stop_engine(&self) -> EngineStopOutcome {
        let pattern = &self.settings.engine.match_pattern;
        let timings = self.settings.timings;

        let matched = self.find_engine_processes().await;
        if matched.is_empty() {
            info!(pattern = %pattern, "No inference engine running");
            return EngineStopOutcome::NothingRunning;
        }

        info!(pids = ?matched, "Sending graceful termination to inference engine");
        let mut signalled = Vec::with_capacity(matched.len());
        for &pid in &matched {
            match self.table.signal(pid, TerminationSignal::Graceful).await {
                Ok(true) => signalled.push(pid),
                Ok(false) => debug!(pid = %pid, "Engine process exited before signal"),
                Err(e) => warn!(pid = %pid, error = %e, "Failed to signal engine process"),
            }
        }

        tokio::time::sleep(timings.grace_period()).await;

        let survivors = self.find_engine_processes().await;
        let mut forced = Vec::new();
        for &pid in &survivors {
            warn!(pid = %pid, "Engine process survived grace period, killing");
            match self.table.signal(pid, TerminationSignal::Forced).await {
                Ok(true) => forced.push(pid),
                Ok(false) => {},
                Err(e) => warn!(pid = %pid, error = %e, "Failed to kill engine process"),
            }
        }

        let remaining = if forced.is_empty() {
            Vec::new()
        } else {
            self.wait_for_exit().await
        };

        if remaining.is_empty() {
            info!("Inference engine stopped");
        } else {
            warn!(pids = ?remaining, "Engine processes still present after forced kill");
        }

        EngineStopOutcome::Stopped {
            signalled,
            forced,
            remaining,
        }
    }

    async fn find_engine_processes(&self) -> Vec<ProcessId> {
        let own = ProcessId::current();
        let mut pids = self
            .table
            .find_matching(&self.settings.engine.match_pattern)
            .await;
        pids.retain(|pid| *pid != own);
        pids
    }

    /// Poll until no engine process matches or the confirmation window ends
    async fn wait_for_exit(&self) -> Vec<ProcessId> {
        let deadline = Instant::now() + self.settings.timings.kill_confirm();
        let interval = std::time::Duration::from_millis(KILL_POLL_INTERVAL_MS)
            .min(self.settings.timings.kill_confirm());

        loop {
            let left = self.find_engine_processes().await;
            if left.is_empty() || Instant::now() >= deadline {
                return left;
            }
            tokio::time::sleep(interval).await;
        }
    }
}
