//! Field and page renderers

pub mod fields;
pub mod html;
pub mod page;

pub use fields::{read_value, render_field, FieldContext};
pub use page::{nonce_action, render_page, PageContext};
