//! Domain service - registration, rendering and saving orchestration

use super::hooks::{EditorWidget, FormHooks, NoOpFormHooks, NonceProvider, TextareaEditor};
use super::registration;
use super::render::{self, PageContext};
use super::repository::OptionStore;
use super::sanitize::sanitize_fields;
use super::schema::FrozenSchema;
use super::tabs::TabState;
use crate::config::Config;
use crate::contract::{OptionRecord, Registry, Section, SettingsPageError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Domain service for one settings page
pub struct Service {
    schema: Arc<FrozenSchema>,
    store: Arc<dyn OptionStore>,
    nonces: Arc<dyn NonceProvider>,
    editor: Arc<dyn EditorWidget>,
    hooks: Arc<dyn FormHooks>,
    config: Config,
    /// Result of the registration pass, computed once
    registry: OnceCell<Registry>,
}

impl Service {
    /// Create a new service with the plain textarea editor and no form hooks
    pub fn new(
        schema: Arc<FrozenSchema>,
        store: Arc<dyn OptionStore>,
        nonces: Arc<dyn NonceProvider>,
        config: Config,
    ) -> Self {
        Self {
            schema,
            store,
            nonces,
            editor: Arc::new(TextareaEditor),
            hooks: Arc::new(NoOpFormHooks),
            config,
            registry: OnceCell::new(),
        }
    }

    /// Replace the rich-text editor widget
    pub fn with_editor(mut self, editor: Arc<dyn EditorWidget>) -> Self {
        self.editor = editor;
        self
    }

    /// Replace the form hooks
    pub fn with_hooks(mut self, hooks: Arc<dyn FormHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schema(&self) -> &FrozenSchema {
        &self.schema
    }

    pub fn nonces(&self) -> &dyn NonceProvider {
        self.nonces.as_ref()
    }

    // ===== Registration =====

    /// Run the registration pass on first call; later calls return the cached registry
    pub async fn register(&self) -> &Registry {
        self.registry
            .get_or_init(|| registration::run(&self.schema, self.store.as_ref()))
            .await
    }

    /// Sections in tab order
    pub fn sections(&self) -> &[Section] {
        self.schema.sections()
    }

    // ===== Option records =====

    /// Stored record of a section, empty when nothing was saved yet
    pub async fn get_option_record(&self, section_id: &str) -> Result<OptionRecord, SettingsPageError> {
        self.require_section(section_id)?;

        Ok(self
            .store
            .read(section_id)
            .await
            .map_err(SettingsPageError::storage)?
            .unwrap_or_default())
    }

    /// Stored value of a field, or the field default when absent
    pub async fn get_value(&self, section_id: &str, field_id: &str) -> Result<Value, SettingsPageError> {
        let record = self.get_option_record(section_id).await?;
        let default = self
            .schema
            .field(section_id, field_id)
            .map(|f| f.default.clone())
            .unwrap_or_else(|| Value::String(String::new()));

        Ok(render::read_value(Some(&record), field_id, &default))
    }

    /// Sanitize and persist a submitted section record.
    ///
    /// When `nonce` is given it must match the section's form token.
    /// In-process callers pass `None`.
    pub async fn save_section(
        &self,
        section_id: &str,
        submitted: OptionRecord,
        nonce: Option<&str>,
    ) -> Result<OptionRecord, SettingsPageError> {
        if let Some(nonce) = nonce {
            let action = render::nonce_action(section_id);
            if !self.nonces.verify(&action, nonce) {
                tracing::warn!("Rejected settings submission for {}: invalid nonce", section_id);
                return Err(SettingsPageError::InvalidNonce { action });
            }
        }

        let registry = self.register().await;
        if registry.setting(section_id).is_none() {
            return Err(SettingsPageError::SectionNotFound {
                section: section_id.to_string(),
            });
        }

        let record = sanitize_fields(registry, section_id, submitted);
        self.store
            .update(section_id, &record)
            .await
            .map_err(SettingsPageError::storage)?;

        tracing::info!("Saved settings section {} ({} values)", section_id, record.len());
        Ok(record)
    }

    // ===== Rendering =====

    /// Render the full page with the given tab preselected
    pub async fn render_page(&self, tab: &TabState) -> Result<String, SettingsPageError> {
        let registry = self.register().await;

        let mut records = HashMap::new();
        for section in &registry.sections {
            if let Some(record) = self
                .store
                .read(&section.id)
                .await
                .map_err(SettingsPageError::storage)?
            {
                records.insert(section.id.clone(), record);
            }
        }

        Ok(render::render_page(&PageContext {
            config: &self.config,
            registry,
            sections: self.schema.sections(),
            records: &records,
            nonces: self.nonces.as_ref(),
            hooks: self.hooks.as_ref(),
            editor: self.editor.as_ref(),
            tab,
        }))
    }

    // ===== Helpers =====

    fn require_section(&self, section_id: &str) -> Result<&Section, SettingsPageError> {
        self.schema
            .section(section_id)
            .ok_or_else(|| SettingsPageError::SectionNotFound {
                section: section_id.to_string(),
            })
    }
}
