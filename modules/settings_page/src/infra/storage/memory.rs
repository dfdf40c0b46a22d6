//! In-memory option store

use crate::contract::OptionRecord;
use crate::domain::repository::OptionStore;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local option store; last write wins
#[derive(Default)]
pub struct InMemoryOptionStore {
    options: RwLock<HashMap<String, OptionRecord>>,
}

impl InMemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing records
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, OptionRecord)>,
    {
        Self {
            options: RwLock::new(records.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.options.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.read().is_empty()
    }
}

#[async_trait]
impl OptionStore for InMemoryOptionStore {
    async fn read(&self, name: &str) -> Result<Option<OptionRecord>> {
        Ok(self.options.read().get(name).cloned())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.options.read().contains_key(name))
    }

    async fn create(&self, name: &str) -> Result<()> {
        self.options.write().entry(name.to_string()).or_default();
        Ok(())
    }

    async fn update(&self, name: &str, record: &OptionRecord) -> Result<()> {
        self.options.write().insert(name.to_string(), record.clone());
        Ok(())
    }
}
