//! Contract models for the settings page
//!
//! These models are transport-agnostic and shared by the domain, the native
//! client and the REST layer.
//! NO serde derives - schema documents and DTOs carry their own.

use super::error::SettingsPageError;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Persisted value of one section: field id -> sanitized value
pub type OptionRecord = serde_json::Map<String, Value>;

/// Description text, either fixed or produced on demand
#[derive(Clone)]
pub enum Description {
    /// Plain text, escaped when rendered as a field description
    Static(String),
    /// Markup producer, its output is emitted verbatim
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Description {
    /// Wrap a closure as a dynamic description
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    /// Static descriptions with no text count as absent
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Static(text) if text.is_empty())
    }

    /// Produce the description text
    pub fn resolve(&self) -> String {
        match self {
            Self::Static(text) => text.clone(),
            Self::Dynamic(producer) => producer(),
        }
    }
}

impl fmt::Debug for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl PartialEq for Description {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Static(a), Self::Static(b)) => a == b,
            (Self::Dynamic(a), Self::Dynamic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Self::Static(text.to_string())
    }
}

impl From<String> for Description {
    fn from(text: String) -> Self {
        Self::Static(text)
    }
}

/// Integrator-supplied sanitizer for one field
#[derive(Clone)]
pub struct Sanitizer(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl Sanitizer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, value: &Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sanitizer(..)")
    }
}

impl PartialEq for Sanitizer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Closed set of field types, each with exactly one renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Title,
    Text,
    Url,
    Email,
    Number,
    Checkbox,
    Multicheck,
    Radio,
    Select,
    Textarea,
    Html,
    Wysiwyg,
    File,
    Image,
    Password,
    Color,
    Separator,
}

impl FieldType {
    pub const ALL: [FieldType; 17] = [
        Self::Title,
        Self::Text,
        Self::Url,
        Self::Email,
        Self::Number,
        Self::Checkbox,
        Self::Multicheck,
        Self::Radio,
        Self::Select,
        Self::Textarea,
        Self::Html,
        Self::Wysiwyg,
        Self::File,
        Self::Image,
        Self::Password,
        Self::Color,
        Self::Separator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Text => "text",
            Self::Url => "url",
            Self::Email => "email",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Multicheck => "multicheck",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Html => "html",
            Self::Wysiwyg => "wysiwyg",
            Self::File => "file",
            Self::Image => "image",
            Self::Password => "password",
            Self::Color => "color",
            Self::Separator => "separator",
        }
    }

    /// Renderer name as seen by hosts that dispatch by string
    pub fn renderer_key(&self) -> String {
        format!("callback_{}", self.as_str())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SettingsPageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SettingsPageError::UnknownFieldType {
                field_type: s.to_string(),
            })
    }
}

/// Submit button options of a section form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    /// Button label, the configured default when absent
    pub label: Option<String>,
    /// Button style (primary, secondary, ...)
    pub kind: String,
    /// Whether the button is wrapped in a paragraph
    pub wrap: bool,
    /// Extra attributes on the input element
    pub attributes: IndexMap<String, String>,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            label: None,
            kind: "primary".to_string(),
            wrap: true,
            attributes: IndexMap::new(),
        }
    }
}

/// One tab of the settings page, persisted as one option record
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Option record key and form scope
    pub id: String,
    /// Tab label and heading
    pub title: String,
    /// Section description, wrapped in a container when registered
    pub description: Option<Description>,
    /// Section callback used when no description is set
    pub callback: Option<Description>,
    /// Submit button options
    pub submit: SubmitButton,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            callback: None,
            submit: SubmitButton::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<Description>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_callback(mut self, callback: Description) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_submit(mut self, submit: SubmitButton) -> Self {
        self.submit = submit;
        self
    }
}

/// Declarative field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Key inside the section record, unique per section
    pub id: String,
    /// Label text
    pub name: String,
    pub field_type: FieldType,
    pub desc: Option<Description>,
    /// CSS size class (regular, small, large) or editor width
    pub size: Option<String>,
    /// Choice labels, editor settings or button label depending on type
    pub options: IndexMap<String, Value>,
    /// Value shown when the record has none
    pub default: Value,
    pub placeholder: String,
    pub sanitize_callback: Option<Sanitizer>,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            field_type: FieldType::Text,
            desc: None,
            size: None,
            options: IndexMap::new(),
            default: Value::String(String::new()),
            placeholder: String::new(),
            sanitize_callback: None,
        }
    }
}

impl FieldSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type,
            ..Self::default()
        }
    }

    pub fn with_desc(mut self, desc: impl Into<Description>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitize_callback = Some(sanitizer);
        self
    }
}

/// Field arguments after default resolution, handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArgs {
    pub id: String,
    pub field_type: FieldType,
    pub name: String,
    /// Composite key `section[id]`
    pub label_for: String,
    pub desc: Option<Description>,
    pub section: String,
    pub size: Option<String>,
    pub options: IndexMap<String, Value>,
    pub default: Value,
    pub placeholder: String,
    pub sanitize_callback: Option<Sanitizer>,
}

/// Section as published by the registration pass
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredSection {
    pub id: String,
    pub title: String,
    pub callback: Option<Description>,
    /// Page group the section is rendered in, equal to the section id
    pub page: String,
}

/// Field as published by the registration pass
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredField {
    /// Composite key `section[id]`
    pub composite_id: String,
    pub label: String,
    pub renderer: FieldType,
    pub page: String,
    pub section: String,
    pub args: FieldArgs,
}

/// Option registration binding a record to the section sanitizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSetting {
    pub group: String,
    pub option_name: String,
}

/// Everything the registration pass publishes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Registry {
    pub sections: Vec<RegisteredSection>,
    pub fields: Vec<RegisteredField>,
    pub settings: Vec<RegisteredSetting>,
}

impl Registry {
    pub fn section(&self, id: &str) -> Option<&RegisteredSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Fields registered under a section, in registration order
    pub fn fields_of<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a RegisteredField> + 'a {
        self.fields.iter().filter(move |f| f.section == section)
    }

    pub fn field<'a>(&'a self, section: &str, field_id: &str) -> Option<&'a RegisteredField> {
        self.fields
            .iter()
            .find(|f| f.section == section && f.args.id == field_id)
    }

    pub fn setting(&self, option_name: &str) -> Option<&RegisteredSetting> {
        self.settings.iter().find(|s| s.option_name == option_name)
    }
}

/// Admin menu entry for the settings page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPage {
    pub page_title: String,
    pub menu_title: String,
    pub capability: String,
    pub slug: String,
}

/// Client asset the page needs enqueued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptAsset {
    pub handle: String,
    /// Source URL, None for assets the host already ships
    pub src: Option<String>,
    pub deps: Vec<String>,
    pub in_footer: bool,
}
