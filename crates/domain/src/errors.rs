//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// A process id could not be parsed
    #[error("Invalid process id: {0}")]
    InvalidProcessId(String),

    /// A process record file had unexpected contents
    #[error("Malformed process record: {0}")]
    MalformedRecord(String),

    /// A command-line match pattern is unusable
    #[error("Invalid command pattern: {0}")]
    InvalidPattern(String),

    /// An argument template referenced an unknown placeholder
    #[error("Unknown placeholder '{placeholder}' in argument '{argument}'")]
    UnknownPlaceholder {
        placeholder: String,
        argument: String,
    },
}

impl DomainError {
    /// Create an unknown placeholder error
    pub fn unknown_placeholder(placeholder: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::UnknownPlaceholder {
            placeholder: placeholder.into(),
            argument: argument.into(),
        }
    }
}
