//! Command-line match pattern
//!
//! Used to discover engine processes that were not started by the current
//! invocation. Matching is a plain substring test against the space-joined
//! argument vector, so `"vllm serve"` matches `python -m vllm serve /models/x`
//! and `/opt/env/bin/vllm serve /models/x` alike.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Substring pattern matched against a process command line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandPattern(String);

impl CommandPattern {
    /// Create a pattern
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for blank input, which would match every
    /// process on the machine.
    pub fn new(pattern: impl Into<String>) -> Result<Self, DomainError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(DomainError::InvalidPattern(
                "pattern must not be blank".to_string(),
            ));
        }
        Ok(Self(pattern))
    }

    /// The raw pattern text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a full command line
    pub fn matches(&self, command_line: &str) -> bool {
        command_line.contains(&self.0)
    }

    /// Check an argument vector by joining it with single spaces
    pub fn matches_args<S: AsRef<str>>(&self, args: &[S]) -> bool {
        let joined = args
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.matches(&joined)
    }
}

impl fmt::Display for CommandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CommandPattern {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommandPattern> for String {
    fn from(pattern: CommandPattern) -> Self {
        pattern.0
    }
}
