//! Declarative schema documents
//!
//! Sections and fields can be described in JSON or YAML instead of being
//! built in code. Documents are deserialized here and converted into
//! contract models.

use crate::contract::{Description, FieldSpec, FieldType, Section, SettingsPageError, SubmitButton};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Label used for fields whose document has no `name`
pub const MISSING_NAME: &str = "No Name Added";

/// Section entry of a schema document
#[derive(Debug, Clone, Deserialize)]
pub struct SectionDoc {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "description")]
    pub desc: Option<String>,
    #[serde(default)]
    pub label_submit: Option<String>,
    #[serde(default = "default_submit_type")]
    pub submit_type: String,
    #[serde(default = "default_true")]
    pub wrap: bool,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
}

/// Field entry of a schema document
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDoc {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "description")]
    pub desc: Option<String>,
    #[serde(default = "default_field_type", rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub options: Option<IndexMap<String, Value>>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

fn default_submit_type() -> String {
    "primary".to_string()
}

fn default_true() -> bool {
    true
}

fn default_field_type() -> String {
    FieldType::Text.as_str().to_string()
}

impl From<SectionDoc> for Section {
    fn from(doc: SectionDoc) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            description: doc.desc.map(Description::Static),
            callback: None,
            submit: SubmitButton {
                label: doc.label_submit,
                kind: doc.submit_type,
                wrap: doc.wrap,
                attributes: doc.attributes,
            },
        }
    }
}

impl TryFrom<FieldDoc> for FieldSpec {
    type Error = SettingsPageError;

    fn try_from(doc: FieldDoc) -> Result<Self, Self::Error> {
        let field_type: FieldType = doc.field_type.parse()?;

        Ok(Self {
            id: doc.id,
            name: doc.name.unwrap_or_else(|| MISSING_NAME.to_string()),
            field_type,
            desc: doc.desc.map(Description::Static),
            size: doc.size,
            options: doc.options.unwrap_or_default(),
            default: match doc.default {
                None | Some(Value::Null) => Value::String(String::new()),
                Some(v) => v,
            },
            placeholder: doc.placeholder.unwrap_or_default(),
            sanitize_callback: None,
        })
    }
}

/// Record every field document is merged over before conversion
pub fn field_defaults() -> serde_json::Map<String, Value> {
    let mut defaults = serde_json::Map::new();
    defaults.insert("id".into(), Value::String(String::new()));
    defaults.insert("name".into(), Value::String(String::new()));
    defaults.insert("desc".into(), Value::String(String::new()));
    defaults.insert("type".into(), Value::String(default_field_type()));
    defaults
}

/// Parse one section document
pub fn parse_section(value: &Value) -> Result<Section, SettingsPageError> {
    if !value.is_object() {
        return Err(SettingsPageError::malformed(
            "section mapping",
            format!("got {}", kind_of(value)),
        ));
    }
    let doc: SectionDoc = serde_json::from_value(value.clone())
        .map_err(|e| SettingsPageError::malformed("section mapping", e.to_string()))?;
    Ok(doc.into())
}

/// Parse a sequence of section documents
pub fn parse_sections(value: &Value) -> Result<Vec<Section>, SettingsPageError> {
    let items = value.as_array().ok_or_else(|| {
        SettingsPageError::malformed("sequence of sections", format!("got {}", kind_of(value)))
    })?;
    items.iter().map(parse_section).collect()
}

/// Parse one field document as given, without merging defaults
pub fn parse_field(value: &Value) -> Result<FieldSpec, SettingsPageError> {
    if !value.is_object() {
        return Err(SettingsPageError::malformed(
            "field mapping",
            format!("got {}", kind_of(value)),
        ));
    }
    let doc: FieldDoc = serde_json::from_value(value.clone())
        .map_err(|e| SettingsPageError::malformed("field mapping", e.to_string()))?;
    doc.try_into()
}

/// Parse one field document merged over [`field_defaults`]
pub fn parse_field_with_defaults(value: &Value) -> Result<FieldSpec, SettingsPageError> {
    let given = value.as_object().ok_or_else(|| {
        SettingsPageError::malformed("field mapping", format!("got {}", kind_of(value)))
    })?;
    let mut merged = field_defaults();
    for (key, v) in given {
        merged.insert(key.clone(), v.clone());
    }
    parse_field(&Value::Object(merged))
}

/// Parse a mapping of section id to field sequences
pub fn parse_fields(value: &Value) -> Result<IndexMap<String, Vec<FieldSpec>>, SettingsPageError> {
    let sections = value.as_object().ok_or_else(|| {
        SettingsPageError::malformed("mapping of section to fields", format!("got {}", kind_of(value)))
    })?;

    let mut parsed = IndexMap::new();
    for (section, fields) in sections {
        let items = fields.as_array().ok_or_else(|| {
            SettingsPageError::malformed(
                "sequence of fields",
                format!("section '{}' holds {}", section, kind_of(fields)),
            )
        })?;
        let specs = items.iter().map(parse_field).collect::<Result<Vec<_>, _>>()?;
        parsed.insert(section.clone(), specs);
    }
    Ok(parsed)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
