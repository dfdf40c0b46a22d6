//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{OptionRecord, Section, SettingsPageApi, SettingsPageError};
use crate::domain::{Service, TabState};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// In-process callers are trusted, so saves skip the form nonce.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SettingsPageApi for NativeClient {
    async fn list_sections(&self) -> Result<Vec<Section>, SettingsPageError> {
        Ok(self.service.sections().to_vec())
    }

    async fn get_option_record(&self, section_id: &str) -> Result<OptionRecord, SettingsPageError> {
        self.service.get_option_record(section_id).await
    }

    async fn get_value(&self, section_id: &str, field_id: &str) -> Result<Value, SettingsPageError> {
        self.service.get_value(section_id, field_id).await
    }

    async fn save_section(
        &self,
        section_id: &str,
        submitted: OptionRecord,
    ) -> Result<OptionRecord, SettingsPageError> {
        self.service.save_section(section_id, submitted, None).await
    }

    async fn render_page(&self, active_tab: Option<String>) -> Result<String, SettingsPageError> {
        self.service.render_page(&TabState::new(active_tab)).await
    }
}
