//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
    mapper::parse_section_form,
};
use crate::domain::{Service, TabState};
use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap},
    response::{Html, Redirect},
    Form, Json,
};
use std::sync::Arc;

/// Notice shown after a successful save
const UPDATED_NOTICE: &str =
    r#"<div id="setting-error-settings_updated" class="notice notice-success settings-error is-dismissible"><p><strong>Settings saved.</strong></p></div>"#;

// ===== Page Handlers =====

/// Render the settings page
///
/// The first tab comes from `?tab=`, else from the tab cookie.
pub async fn render_page(
    service: Arc<Service>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, Problem> {
    let tab = match query.tab {
        Some(tab) => TabState::new(Some(tab)),
        None => headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(TabState::from_cookie_header)
            .find(|t| t.active().is_some())
            .unwrap_or_default(),
    };

    let mut page = service.render_page(&tab).await.map_err(map_domain_error)?;

    if query.settings_updated.as_deref() == Some("true") {
        if let Some(pos) = page.find("</h1>") {
            page.insert_str(pos + "</h1>".len(), UPDATED_NOTICE);
        }
    }

    Ok(Html(page))
}

/// Save one section form and redirect back to the page
pub async fn save_options(
    service: Arc<Service>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, Problem> {
    let submission = parse_section_form(&pairs).map_err(map_domain_error)?;
    let nonce = submission.nonce.unwrap_or_default();

    service
        .save_section(&submission.section, submission.record, Some(&nonce))
        .await
        .map_err(map_domain_error)?;

    let page_path = service.config().page_path();
    let back = submission
        .referer
        .filter(|r| r.starts_with('/') && !r.starts_with("//"))
        .unwrap_or(page_path);
    let separator = if back.contains('?') { '&' } else { '?' };

    Ok(Redirect::to(&format!("{}{}settings-updated=true", back, separator)))
}

// ===== Option Record Handlers =====

/// List sections in tab order
pub async fn list_sections(service: Arc<Service>) -> Json<SectionsListResponse> {
    let items: Vec<SectionDto> = service
        .sections()
        .iter()
        .map(|s| SectionDto::from_schema(s, service.schema()))
        .collect();
    let total = items.len();

    Json(SectionsListResponse { items, total })
}

/// Get the stored record of a section
pub async fn get_option_record(
    service: Arc<Service>,
    Path(section): Path<String>,
) -> Result<Json<OptionRecordDto>, Problem> {
    let values = service
        .get_option_record(&section)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(OptionRecordDto::new(section, values)))
}
