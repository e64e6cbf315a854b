//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Runtime environment or executable missing; nothing was started
    #[error("Setup failed: {0}")]
    SetupFailed(String),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Spawning, waiting on or signalling a process failed
    #[error("Process error: {0}")]
    Process(String),

    /// The lifecycle lock could not be taken
    #[error("Lock error: {0}")]
    Lock(String),

    /// Configuration values cannot be turned into a command line
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the error happened before anything was spawned
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::SetupFailed(_) | Self::Configuration(_) | Self::Domain(_)
        )
    }

    /// Wrap an I/O error with the path it concerned
    pub fn io(context: impl std::fmt::Display, err: &std::io::Error) -> Self {
        Self::Io(format!("{context}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_failures_are_classified() {
        assert!(ApplicationError::SetupFailed("no vllm".into()).is_setup_failure());
        assert!(ApplicationError::Configuration("bad".into()).is_setup_failure());
        assert!(!ApplicationError::Process("spawn".into()).is_setup_failure());
    }

    #[test]
    fn io_helper_includes_context() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let app = ApplicationError::io("logs/engine.log", &err);
        assert_eq!(app.to_string(), "I/O error: logs/engine.log: missing");
    }

    #[test]
    fn domain_errors_convert() {
        let app: ApplicationError = DomainError::InvalidProcessId("x".into()).into();
        assert_eq!(app.to_string(), "Invalid process id: x");
    }
}
