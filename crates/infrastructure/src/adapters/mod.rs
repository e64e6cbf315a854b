//! Adapters implementing application ports

mod directories;
mod engine_health;
mod lifecycle_lock;
pub mod listeners;
mod port_probe;
mod process_launcher;
mod process_table;
mod record_store;
mod runtime_resolver;

pub use directories::FsDirectories;
pub use engine_health::EngineHealthAdapter;
pub use lifecycle_lock::FileLifecycleLock;
pub use port_probe::TcpPortProbe;
pub use process_launcher::TokioProcessLauncher;
pub use process_table::SysinfoProcessTable;
pub use record_store::FileRecordStore;
pub use runtime_resolver::PathRuntimeResolver;
