//! Infrastructure layer - Adapters for the operating system
//!
//! Implements the ports defined in the application layer: process table,
//! port probing, process records, subprocess spawning, the lifecycle lock
//! and runtime resolution. Also owns configuration loading and tracing setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, CONFIG_ENV_PREFIX, DEFAULT_CONFIG_NAME};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_tracing};
