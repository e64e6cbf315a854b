//! Process record store port
//!
//! Holds the record of the asset server spawned by the launcher. The store is
//! bound to one location at construction.

use async_trait::async_trait;
use domain::ProcessRecord;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for persisting the background process record
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessRecordStore: Send + Sync {
    /// Read the record; `Ok(None)` when no record exists
    async fn load(&self) -> Result<Option<ProcessRecord>, ApplicationError>;

    /// Write the record, replacing any previous one
    async fn save(&self, record: &ProcessRecord) -> Result<(), ApplicationError>;

    /// Delete the record; `Ok(false)` when there was nothing to delete
    async fn remove(&self) -> Result<bool, ApplicationError>;
}
