//! Domain layer for omni-serve
//!
//! Contains the settings that describe the two supervised services, process
//! identity primitives and the rules for deriving subprocess command lines.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
