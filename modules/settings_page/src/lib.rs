//! Settings Page Module
//!
//! Declarative settings pages for host admin panels. Sections and fields
//! are described once, registered against the host's option storage,
//! rendered as a tabbed page with one form per section, and sanitized per
//! field type on save.

// Public exports
pub mod contract;
pub use contract::{
    client::SettingsPageApi, error::SettingsPageError, Description, FieldSpec, FieldType,
    OptionRecord, Registry, Sanitizer, Section, SubmitButton,
};

pub mod module;
pub use module::{LifecycleEvent, LifecycleOutput, SettingsPageModule};

pub mod config;
pub use config::Config;

pub mod domain;
pub use domain::{FrozenSchema, SchemaRegistry, Service, TabState};

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod infra;
