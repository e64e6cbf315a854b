//! Operating-system process identifier

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// An operating-system process id
///
/// Process id 0 is rejected when parsed: signalling it would target the
/// caller's whole process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(u32);

impl ProcessId {
    /// Wrap a raw process id
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw process id
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Process id of the current process
    pub fn current() -> Self {
        Self(std::process::id())
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<u32>() {
            Ok(0) | Err(_) => Err(DomainError::InvalidProcessId(trimmed.to_string())),
            Ok(raw) => Ok(Self(raw)),
        }
    }
}

impl From<u32> for ProcessId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_surrounding_whitespace() {
        let pid: ProcessId = " 4242\n".parse().unwrap();
        assert_eq!(pid.as_u32(), 4242);
    }

    #[test]
    fn rejects_zero() {
        assert!("0".parse::<ProcessId>().is_err());
    }

    #[test]
    fn rejects_garbage() {
        let err = "not-a-pid".parse::<ProcessId>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid process id: not-a-pid");
    }

    #[test]
    fn display_is_raw_number() {
        assert_eq!(ProcessId::new(17).to_string(), "17");
    }

    #[test]
    fn current_is_this_process() {
        assert_eq!(ProcessId::current().as_u32(), std::process::id());
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&ProcessId::new(99)).unwrap();
        assert_eq!(json, "99");
    }
}
