//! Application layer - Lifecycle use cases
//!
//! Contains the launcher, terminator and status services together with the
//! ports they drive. Operating-system adapters live in the infrastructure
//! layer.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
