//! Registration pass
//!
//! Publishes the frozen schema as an explicit [`Registry`]: one page group
//! per section, one entry per field, one sanitized option per section.

use super::document::MISSING_NAME;
use super::repository::OptionStore;
use super::schema::FrozenSchema;
use crate::contract::{
    Description, FieldArgs, FieldSpec, RegisteredField, RegisteredSection, RegisteredSetting,
    Registry, Section,
};
use std::collections::HashSet;

/// Storage key of a field: `section[field]`
pub fn composite_key(section_id: &str, field_id: &str) -> String {
    format!("{}[{}]", section_id, field_id)
}

/// Section description wrapped in its container, else the section callback
pub fn section_callback(section: &Section) -> Option<Description> {
    match &section.description {
        Some(Description::Static(text)) if !text.is_empty() => Some(Description::Static(format!(
            r#"<div class="inside">{}</div>"#,
            text
        ))),
        Some(dynamic @ Description::Dynamic(_)) => Some(dynamic.clone()),
        _ => section.callback.clone(),
    }
}

/// Field arguments with every optional attribute resolved
pub fn resolve_field(section_id: &str, field: &FieldSpec) -> FieldArgs {
    FieldArgs {
        id: field.id.clone(),
        field_type: field.field_type,
        name: if field.name.is_empty() {
            MISSING_NAME.to_string()
        } else {
            field.name.clone()
        },
        label_for: composite_key(section_id, &field.id),
        desc: field.desc.clone().filter(|d| !d.is_empty()),
        section: section_id.to_string(),
        size: field.size.clone(),
        options: field.options.clone(),
        default: field.default.clone(),
        placeholder: field.placeholder.clone(),
        sanitize_callback: field.sanitize_callback.clone(),
    }
}

/// Build the registry from the schema; no side effects
pub fn build_registry(schema: &FrozenSchema) -> Registry {
    let mut registry = Registry::default();

    for section in schema.sections() {
        tracing::debug!("Registering settings section: {}", section.id);
        registry.sections.push(RegisteredSection {
            id: section.id.clone(),
            title: section.title.clone(),
            callback: section_callback(section),
            page: section.id.clone(),
        });
    }

    for (section_id, fields) in schema.fields() {
        for field in fields {
            let args = resolve_field(section_id, field);
            tracing::debug!(
                "Registering settings field: {} ({})",
                args.label_for,
                args.field_type.renderer_key()
            );
            registry.fields.push(RegisteredField {
                composite_id: args.label_for.clone(),
                label: args.name.clone(),
                renderer: args.field_type,
                page: section_id.clone(),
                section: section_id.clone(),
                args,
            });
        }
    }

    for section in schema.sections() {
        registry.settings.push(RegisteredSetting {
            group: section.id.clone(),
            option_name: section.id.clone(),
        });
    }

    registry
}

/// Create an empty record for every section that has none.
///
/// Returns the ids of sections whose record could not be created.
pub async fn ensure_option_records(schema: &FrozenSchema, store: &dyn OptionStore) -> HashSet<String> {
    let mut failed = HashSet::new();

    for section in schema.sections() {
        let result = match store.exists(&section.id).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::debug!("Creating empty option record: {}", section.id);
                store.create(&section.id).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!("Skipping section {}: option record unavailable: {}", section.id, e);
            failed.insert(section.id.clone());
        }
    }

    failed
}

/// Run the full pass: ensure records exist, then publish the schema.
///
/// Sections whose record is unavailable are left out together with their
/// fields and option registration.
pub async fn run(schema: &FrozenSchema, store: &dyn OptionStore) -> Registry {
    let failed = ensure_option_records(schema, store).await;
    let mut registry = build_registry(schema);

    if !failed.is_empty() {
        registry.sections.retain(|s| !failed.contains(&s.id));
        registry.fields.retain(|f| !failed.contains(&f.section));
        registry.settings.retain(|s| !failed.contains(&s.option_name));
    }

    tracing::info!(
        "Settings registration completed: {} sections, {} fields",
        registry.sections.len(),
        registry.fields.len()
    );
    registry
}
