//! REST DTOs with serde derives for HTTP API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Section DTOs =====

/// Section summary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectionDto {
    /// Section id, also the option record name
    #[schema(example = "general")]
    pub id: String,

    /// Tab title
    #[schema(example = "General")]
    pub title: String,

    /// Field ids in render order
    pub fields: Vec<String>,
}

/// List of sections in tab order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectionsListResponse {
    pub items: Vec<SectionDto>,
    pub total: usize,
}

// ===== Option Record DTOs =====

/// Stored record of one section
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionRecordDto {
    /// Section id
    #[schema(example = "general")]
    pub section: String,

    /// Field id to stored value
    #[schema(value_type = Object)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

// ===== Page DTOs =====

/// Query parameters of the page request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PageQuery {
    /// Tab to show first, overrides the tab cookie
    pub tab: Option<String>,

    /// Set after a successful save
    #[serde(rename = "settings-updated")]
    pub settings_updated: Option<String>,
}
