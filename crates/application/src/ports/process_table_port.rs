//! Process table port
//!
//! Inspection and signalling of processes that this invocation does not own
//! a handle for.

use async_trait::async_trait;
use domain::{CommandPattern, ProcessId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Signal sent to a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// Catchable request to shut down (SIGTERM)
    Graceful,
    /// Non-catchable kill (SIGKILL)
    Forced,
}

/// Snapshot of a live process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: ProcessId,
    /// Start time as reported by the OS
    pub start_time: u64,
    /// Argument vector, including the program
    pub command_line: Vec<String>,
}

impl ProcessInfo {
    pub fn new(pid: ProcessId, start_time: u64) -> Self {
        Self {
            pid,
            start_time,
            command_line: Vec::new(),
        }
    }
}

/// Port for the operating system's process table
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessTablePort: Send + Sync {
    /// Look up a live process; exited and zombie processes yield `None`
    async fn inspect(&self, pid: ProcessId) -> Option<ProcessInfo>;

    /// All live processes whose command line matches the pattern
    async fn find_matching(&self, pattern: &CommandPattern) -> Vec<ProcessId>;

    /// Processes holding a listening TCP socket on the port
    async fn listeners_on_port(&self, port: u16) -> Vec<ProcessId>;

    /// Deliver a signal; `Ok(false)` when the process was already gone
    async fn signal(
        &self,
        pid: ProcessId,
        signal: TerminationSignal,
    ) -> Result<bool, ApplicationError>;
}
