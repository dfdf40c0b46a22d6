//! Repository traits for option records
//!
//! The host owns persistence; these traits are the seam it plugs into.
//! Implementations are in infra/storage.

use crate::contract::OptionRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Key/value store of option records keyed by section id
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// Read a record, None when the option does not exist
    async fn read(&self, name: &str) -> Result<Option<OptionRecord>>;

    /// Check if an option exists
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Create an empty record if none exists
    async fn create(&self, name: &str) -> Result<()>;

    /// Replace a record, creating it when missing
    async fn update(&self, name: &str, record: &OptionRecord) -> Result<()>;
}
