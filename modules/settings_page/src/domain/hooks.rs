//! Host extension points used while rendering and saving
//!
//! Rich-text editing, form hooks and form tokens belong to the host; the
//! page only calls into these traits.

use crate::contract::Section;
use indexmap::IndexMap;
use serde_json::Value;

use super::render::html::{esc_attr, esc_textarea};

/// Extra markup injected at the top and bottom of each section form
pub trait FormHooks: Send + Sync {
    fn form_top(&self, _section: &Section) -> String {
        String::new()
    }

    fn form_bottom(&self, _section: &Section) -> String {
        String::new()
    }
}

/// No-op form hooks for when nothing is injected
pub struct NoOpFormHooks;

impl FormHooks for NoOpFormHooks {}

/// Rich-text editor widget provided by the host
pub trait EditorWidget: Send + Sync {
    /// Render an editor for `value`, submitting under `settings["textarea_name"]`
    fn render(&self, value: &str, editor_id: &str, settings: &IndexMap<String, Value>) -> String;
}

/// Fallback editor: a plain textarea honouring `textarea_name` and `textarea_rows`
pub struct TextareaEditor;

impl EditorWidget for TextareaEditor {
    fn render(&self, value: &str, editor_id: &str, settings: &IndexMap<String, Value>) -> String {
        let name = settings
            .get("textarea_name")
            .and_then(Value::as_str)
            .unwrap_or(editor_id);
        let rows = settings
            .get("textarea_rows")
            .and_then(Value::as_u64)
            .unwrap_or(10);
        let teeny = settings
            .get("teeny")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        format!(
            r#"<textarea class="wp-editor-area{}" rows="{}" id="{}" name="{}">{}</textarea>"#,
            if teeny { " teeny" } else { "" },
            rows,
            esc_attr(editor_id),
            esc_attr(name),
            esc_textarea(value)
        )
    }
}

/// Issues and checks the per-section form token
pub trait NonceProvider: Send + Sync {
    fn create(&self, action: &str) -> String;

    fn verify(&self, action: &str, nonce: &str) -> bool;
}
