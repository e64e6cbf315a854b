//! Process table adapter backed by `sysinfo`

use std::sync::Arc;

use application::error::ApplicationError;
use application::ports::{ProcessInfo, ProcessTablePort, TerminationSignal};
use async_trait::async_trait;
use domain::{CommandPattern, ProcessId};
use parking_lot::Mutex;
use sysinfo::{
    Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, Signal, System, UpdateKind,
};
use tracing::{debug, instrument, warn};

use super::listeners;

/// Process table of the local machine
#[derive(Clone)]
pub struct SysinfoProcessTable {
    system: Arc<Mutex<System>>,
}

impl std::fmt::Debug for SysinfoProcessTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoProcessTable").finish_non_exhaustive()
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

fn refresh_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always)
}

/// Live, non-thread, non-zombie process
fn is_alive(process: &Process) -> bool {
    process.thread_kind().is_none()
        && !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
}

fn command_line(process: &Process) -> Vec<String> {
    process
        .cmd()
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }

    /// Run a blocking closure against a refreshed table
    async fn with_system<T, F>(&self, pids: Option<Vec<Pid>>, f: F) -> Result<T, ApplicationError>
    where
        T: Send + 'static,
        F: FnOnce(&System) -> T + Send + 'static,
    {
        let system = Arc::clone(&self.system);
        tokio::task::spawn_blocking(move || {
            let mut system = system.lock();
            let targets = pids
                .as_deref()
                .map_or(ProcessesToUpdate::All, ProcessesToUpdate::Some);
            system.refresh_processes_specifics(targets, true, refresh_kind());
            f(&system)
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("process table task failed: {e}")))
    }

    fn info(pid: ProcessId, process: &Process) -> ProcessInfo {
        ProcessInfo {
            pid,
            start_time: process.start_time(),
            command_line: command_line(process),
        }
    }
}

#[async_trait]
impl ProcessTablePort for SysinfoProcessTable {
    async fn inspect(&self, pid: ProcessId) -> Option<ProcessInfo> {
        let target = Pid::from_u32(pid.as_u32());
        self.with_system(Some(vec![target]), move |system| {
            system
                .process(target)
                .filter(|p| is_alive(p))
                .map(|p| Self::info(pid, p))
        })
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Process lookup failed");
            None
        })
    }

    #[instrument(skip(self))]
    async fn find_matching(&self, pattern: &CommandPattern) -> Vec<ProcessId> {
        let pattern = pattern.clone();
        let result = self
            .with_system(None, move |system| {
                let mut pids: Vec<ProcessId> = system
                    .processes()
                    .iter()
                    .filter(|(_, p)| {
                        is_alive(p) && pattern.matches_args(command_line(p).as_slice())
                    })
                    .map(|(pid, _)| ProcessId::new(pid.as_u32()))
                    .collect();
                pids.sort_unstable();
                pids
            })
            .await;

        match result {
            Ok(pids) => {
                debug!(count = pids.len(), "Matched processes");
                pids
            },
            Err(e) => {
                warn!(error = %e, "Process scan failed");
                Vec::new()
            },
        }
    }

    async fn listeners_on_port(&self, port: u16) -> Vec<ProcessId> {
        match tokio::task::spawn_blocking(move || listeners::find_listeners(port)).await {
            Ok(pids) => pids.into_iter().map(ProcessId::new).collect(),
            Err(e) => {
                warn!(error = %e, port, "Listener discovery failed");
                Vec::new()
            },
        }
    }

    #[instrument(skip(self))]
    async fn signal(
        &self,
        pid: ProcessId,
        signal: TerminationSignal,
    ) -> Result<bool, ApplicationError> {
        let target = Pid::from_u32(pid.as_u32());
        let delivered = self
            .with_system(Some(vec![target]), move |system| {
                let process = system.process(target).filter(|p| is_alive(p))?;
                let sent = match signal {
                    TerminationSignal::Graceful => process.kill_with(Signal::Term).unwrap_or(false),
                    TerminationSignal::Forced => process.kill(),
                };
                Some(sent)
            })
            .await?;

        match delivered {
            None => Ok(false),
            Some(true) => Ok(true),
            Some(false) => {
                // Exited between the refresh and the signal
                if self.inspect(pid).await.is_none() {
                    return Ok(false);
                }
                Err(ApplicationError::Process(format!(
                    "failed to send {signal:?} to process {pid}"
                )))
            },
        }
    }
}
