//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::SettingsPageApi;
pub use error::SettingsPageError;
pub use model::{
    Description, FieldArgs, FieldSpec, FieldType, MenuPage, OptionRecord, RegisteredField,
    RegisteredSection, RegisteredSetting, Registry, Sanitizer, ScriptAsset, Section, SubmitButton,
};
