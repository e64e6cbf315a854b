//! Fixed waits used by the launcher and terminator

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settle and grace delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTimings {
    /// Wait after spawning the asset server before re-probing its port
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Wait between the graceful signal and the forced kill
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// How long to wait for force-killed processes to disappear
    #[serde(default = "default_kill_confirm_ms")]
    pub kill_confirm_ms: u64,

    /// Connect timeout for a single port probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

const fn default_settle_delay_ms() -> u64 {
    2000
}

const fn default_grace_period_ms() -> u64 {
    5000
}

const fn default_kill_confirm_ms() -> u64 {
    2000
}

const fn default_probe_timeout_ms() -> u64 {
    500
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            grace_period_ms: default_grace_period_ms(),
            kill_confirm_ms: default_kill_confirm_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl LifecycleTimings {
    /// Timings with every wait shortened to `ms`, for tests and dry runs
    pub const fn uniform(ms: u64) -> Self {
        Self {
            settle_delay_ms: ms,
            grace_period_ms: ms,
            kill_confirm_ms: ms,
            probe_timeout_ms: ms,
        }
    }

    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub const fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub const fn kill_confirm(&self) -> Duration {
        Duration::from_millis(self.kill_confirm_ms)
    }

    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
