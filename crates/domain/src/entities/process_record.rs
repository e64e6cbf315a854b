//! Background process record
//!
//! Written when the launcher spawns the asset server and consumed by the
//! terminator. The on-disk form is line oriented so that `kill $(head -1 f)`
//! keeps working:
//!
//! ```text
//! 12345
//! 98765
//! ```
//!
//! The first line is the process id, the optional second line the process
//! start time reported by the OS. The start time lets the terminator tell the
//! recorded process apart from an unrelated process that reused its id.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::ProcessId;

/// A persisted reference to a process spawned by this tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Recorded process id
    pub pid: ProcessId,
    /// Start time of the recorded process, if it was known at spawn time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
}

impl ProcessRecord {
    /// Record without identity information
    pub const fn new(pid: ProcessId) -> Self {
        Self {
            pid,
            start_time: None,
        }
    }

    /// Attach the process start time
    #[must_use]
    pub const fn with_start_time(mut self, start_time: u64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Parse the on-disk representation
    pub fn parse(contents: &str) -> Result<Self, DomainError> {
        let mut lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());

        let pid = lines
            .next()
            .ok_or_else(|| DomainError::MalformedRecord("record is empty".to_string()))?
            .parse::<ProcessId>()?;

        let start_time = match lines.next() {
            Some(line) => Some(line.parse::<u64>().map_err(|_| {
                DomainError::MalformedRecord(format!("invalid start time: {line}"))
            })?),
            None => None,
        };

        Ok(Self { pid, start_time })
    }

    /// Render the on-disk representation
    pub fn to_file_contents(&self) -> String {
        match self.start_time {
            Some(start) => format!("{}\n{start}\n", self.pid),
            None => format!("{}\n", self.pid),
        }
    }

    /// Whether an observed start time identifies the recorded process
    ///
    /// Records without a start time cannot be checked and are accepted.
    pub fn is_same_process(&self, observed_start_time: u64) -> bool {
        self.start_time
            .is_none_or(|recorded| recorded == observed_start_time)
    }
}
