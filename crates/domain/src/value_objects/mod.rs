//! Value Objects - Immutable, identity-less domain primitives

mod command_pattern;
mod process_id;

pub use command_pattern::CommandPattern;
pub use process_id::ProcessId;
