//! Lifecycle lock port
//!
//! Serializes the check-and-spawn section of the launcher against other
//! launchers and against the terminator.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Held lock; released on drop
pub struct LockGuard(#[allow(dead_code)] Box<dyn Any + Send>);

impl LockGuard {
    /// Wrap whatever keeps the lock alive
    pub fn new<T: Any + Send>(inner: T) -> Self {
        Self(Box::new(inner))
    }

    /// Guard that holds nothing
    pub fn noop() -> Self {
        Self::new(())
    }
}

impl fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LockGuard")
    }
}

/// Port for the exclusive lifecycle lock
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LifecycleLockPort: Send + Sync {
    /// Block until the lock is held
    async fn acquire(&self) -> Result<LockGuard, ApplicationError>;
}
