//! Contract error types for the settings page
//!
//! These errors are transport-agnostic and used for inter-module communication.

/// Settings page domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsPageError {
    /// Schema input has the wrong shape; nothing was changed
    #[error("Malformed input: expected {expected}, {details}")]
    MalformedInput {
        /// Expected shape (sequence of sections, field mapping, ...)
        expected: String,
        /// What was wrong with the input
        details: String,
    },
    /// Field type outside the supported set
    #[error("Unknown field type: {field_type}")]
    UnknownFieldType { field_type: String },
    /// Section id not present in the schema
    #[error("section not found: {section}")]
    SectionNotFound { section: String },
    /// Form token did not match the section
    #[error("Invalid nonce for {action}")]
    InvalidNonce { action: String },
    /// Option store failure
    #[error("Storage error: {message}")]
    Storage { message: String },
    /// Internal error
    #[error("Internal error")]
    Internal,
}

impl SettingsPageError {
    pub(crate) fn malformed(expected: impl Into<String>, details: impl Into<String>) -> Self {
        Self::MalformedInput {
            expected: expected.into(),
            details: details.into(),
        }
    }

    pub(crate) fn storage(error: anyhow::Error) -> Self {
        tracing::error!("Option store error: {:?}", error);
        Self::Storage {
            message: error.to_string(),
        }
    }
}
