//! Native client trait for inter-module communication
//!
//! Other modules read and write settings-page values through this trait.
//! NO HTTP - direct function calls.

use super::{
    error::SettingsPageError,
    model::{OptionRecord, Section},
};
use async_trait::async_trait;
use serde_json::Value;

/// Settings page API for inter-module communication
#[async_trait]
pub trait SettingsPageApi: Send + Sync {
    /// Sections in tab order
    async fn list_sections(&self) -> Result<Vec<Section>, SettingsPageError>;

    /// Stored record of a section, empty when nothing was saved yet
    async fn get_option_record(&self, section_id: &str) -> Result<OptionRecord, SettingsPageError>;

    /// Stored value of a field, or its default
    async fn get_value(&self, section_id: &str, field_id: &str) -> Result<Value, SettingsPageError>;

    /// Sanitize and persist a section record (trusted in-process caller, no nonce)
    async fn save_section(
        &self,
        section_id: &str,
        submitted: OptionRecord,
    ) -> Result<OptionRecord, SettingsPageError>;

    /// Render the full settings page with the given tab preselected
    async fn render_page(&self, active_tab: Option<String>) -> Result<String, SettingsPageError>;
}
