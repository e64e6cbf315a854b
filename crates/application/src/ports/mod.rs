//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! the operating system and the engine. Adapters in the infrastructure layer
//! implement these ports.

mod directory_port;
mod engine_health_port;
mod engine_runtime_port;
mod lifecycle_lock_port;
mod port_probe_port;
mod process_launcher_port;
mod process_record_store;
mod process_table_port;

#[cfg(test)]
pub use directory_port::MockDirectoryPort;
pub use directory_port::DirectoryPort;
#[cfg(test)]
pub use engine_health_port::MockEngineHealthPort;
pub use engine_health_port::EngineHealthPort;
#[cfg(test)]
pub use engine_runtime_port::MockEngineRuntimePort;
pub use engine_runtime_port::EngineRuntimePort;
#[cfg(test)]
pub use lifecycle_lock_port::MockLifecycleLockPort;
pub use lifecycle_lock_port::{LifecycleLockPort, LockGuard};
#[cfg(test)]
pub use port_probe_port::MockPortProbePort;
pub use port_probe_port::PortProbePort;
#[cfg(test)]
pub use process_launcher_port::MockProcessLauncherPort;
pub use process_launcher_port::ProcessLauncherPort;
#[cfg(test)]
pub use process_record_store::MockProcessRecordStore;
pub use process_record_store::ProcessRecordStore;
#[cfg(test)]
pub use process_table_port::MockProcessTablePort;
pub use process_table_port::{ProcessInfo, ProcessTablePort, TerminationSignal};
