//! Schema registry
//!
//! Mutable while the integrator describes sections and fields, frozen
//! before the registration pass so the published schema cannot drift.

use super::document;
use crate::contract::{FieldSpec, Section, SettingsPageError};
use indexmap::IndexMap;
use serde_json::Value;

/// Mutable registry used while the page is being described
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    sections: Vec<Section>,
    fields: IndexMap<String, Vec<FieldSpec>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all sections
    pub fn set_sections(&mut self, sections: Vec<Section>) -> &mut Self {
        self.sections = sections;
        self
    }

    /// Append a section after the existing ones
    pub fn add_section(&mut self, section: Section) -> &mut Self {
        tracing::debug!("Adding settings section: {}", section.id);
        self.sections.push(section);
        self
    }

    /// Replace all field definitions
    pub fn set_fields(&mut self, fields: IndexMap<String, Vec<FieldSpec>>) -> &mut Self {
        self.fields = fields;
        self
    }

    /// Append a field to a section
    pub fn add_field(&mut self, section_id: impl Into<String>, field: FieldSpec) -> &mut Self {
        self.fields.entry(section_id.into()).or_default().push(field);
        self
    }

    /// Replace all sections from a document; the registry is untouched on error
    pub fn load_sections(&mut self, value: &Value) -> Result<&mut Self, SettingsPageError> {
        let sections = document::parse_sections(value)?;
        Ok(self.set_sections(sections))
    }

    /// Append one section from a document
    pub fn load_section(&mut self, value: &Value) -> Result<&mut Self, SettingsPageError> {
        let section = document::parse_section(value)?;
        Ok(self.add_section(section))
    }

    /// Replace all fields from a `section -> [field]` document
    pub fn load_fields(&mut self, value: &Value) -> Result<&mut Self, SettingsPageError> {
        let fields = document::parse_fields(value)?;
        Ok(self.set_fields(fields))
    }

    /// Append one field document, merged over the default field record
    pub fn load_field(
        &mut self,
        section_id: impl Into<String>,
        value: &Value,
    ) -> Result<&mut Self, SettingsPageError> {
        let field = document::parse_field_with_defaults(value)?;
        Ok(self.add_field(section_id, field))
    }

    /// Load a whole schema document with `sections` and `fields` keys
    pub fn load_document(&mut self, value: &Value) -> Result<&mut Self, SettingsPageError> {
        let doc = value.as_object().ok_or_else(|| {
            SettingsPageError::malformed("schema mapping", "document root must be a mapping")
        })?;

        // Parse both parts before touching the registry
        let sections = match doc.get("sections") {
            Some(v) => Some(document::parse_sections(v)?),
            None => None,
        };
        let fields = match doc.get("fields") {
            Some(v) => Some(document::parse_fields(v)?),
            None => None,
        };

        if let Some(sections) = sections {
            self.set_sections(sections);
        }
        if let Some(fields) = fields {
            self.set_fields(fields);
        }
        Ok(self)
    }

    /// Load a YAML schema document
    pub fn load_yaml(&mut self, source: &str) -> Result<&mut Self, SettingsPageError> {
        let value: Value = serde_yaml::from_str(source)
            .map_err(|e| SettingsPageError::malformed("YAML schema document", e.to_string()))?;
        self.load_document(&value)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn fields(&self) -> &IndexMap<String, Vec<FieldSpec>> {
        &self.fields
    }

    /// Freeze the registry (make it immutable)
    pub fn freeze(self) -> FrozenSchema {
        tracing::info!(
            "Freezing settings schema with {} sections and {} fields",
            self.sections.len(),
            self.fields.values().map(Vec::len).sum::<usize>()
        );
        FrozenSchema {
            sections: self.sections,
            fields: self.fields,
        }
    }
}

/// Immutable schema shared by registration and rendering
#[derive(Debug, Clone, Default)]
pub struct FrozenSchema {
    sections: Vec<Section>,
    fields: IndexMap<String, Vec<FieldSpec>>,
}

impl FrozenSchema {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// All field definitions keyed by section id, in insertion order
    pub fn fields(&self) -> &IndexMap<String, Vec<FieldSpec>> {
        &self.fields
    }

    pub fn fields_of(&self, section_id: &str) -> &[FieldSpec] {
        self.fields.get(section_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn field(&self, section_id: &str, field_id: &str) -> Option<&FieldSpec> {
        self.fields_of(section_id).iter().find(|f| f.id == field_id)
    }
}
