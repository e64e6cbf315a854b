//! Engine runtime port
//!
//! Turns the configured engine command into something that can be executed:
//! activates the isolated runtime environment and locates the executable.

use domain::CommandSpec;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for preparing the engine's execution environment
#[cfg_attr(test, automock)]
pub trait EngineRuntimePort: Send + Sync {
    /// Resolve the program path and layer the runtime environment onto the
    /// command
    ///
    /// Returns `SetupFailed` when the runtime directory or the executable is
    /// missing.
    fn resolve(&self, command: CommandSpec) -> Result<CommandSpec, ApplicationError>;
}
