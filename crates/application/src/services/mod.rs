//! Application services
//!
//! Use cases that drive the lifecycle of the supervised processes.

mod launcher_service;
mod status_service;
mod terminator_service;

pub use launcher_service::{AssetServerStatus, LauncherService, PreparedLaunch};
pub use status_service::{
    AssetServerReport, EngineReport, RecordStatus, StatusReport, StatusService,
};
pub use terminator_service::{EngineStopOutcome, RecordOutcome, StopReport, TerminatorService};
