//! Process launcher port
//!
//! Starts subprocesses either detached (the asset server) or in the
//! foreground with output teed to a log (the engine).

use std::path::Path;

use async_trait::async_trait;
use domain::{CommandSpec, ProcessRecord};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for spawning subprocesses
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessLauncherPort: Send + Sync {
    /// Start a process that outlives the caller
    ///
    /// The process gets its own process group, a closed stdin and its output
    /// appended to `log_file`. Returns a record identifying it.
    async fn spawn_detached(
        &self,
        command: &CommandSpec,
        log_file: &Path,
    ) -> Result<ProcessRecord, ApplicationError>;

    /// Run a process to completion
    ///
    /// Stdout and stderr are copied to the caller's terminal and appended to
    /// `log_file`. Returns the exit code; death by signal `n` maps to
    /// `128 + n`.
    async fn run_foreground(
        &self,
        command: &CommandSpec,
        log_file: &Path,
    ) -> Result<i32, ApplicationError>;
}
