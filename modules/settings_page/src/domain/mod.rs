//! Domain layer - schema, registration, rendering and sanitization

pub mod document;
pub mod hooks;
pub mod registration;
pub mod render;
pub mod repository;
pub mod sanitize;
pub mod schema;
pub mod service;
pub mod tabs;

pub use hooks::{EditorWidget, FormHooks, NoOpFormHooks, NonceProvider, TextareaEditor};
pub use repository::OptionStore;
pub use schema::{FrozenSchema, SchemaRegistry};
pub use service::Service;
pub use tabs::TabState;
