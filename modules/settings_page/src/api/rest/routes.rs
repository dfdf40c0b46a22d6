//! Route registration

use super::{dto::*, handlers};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::HeaderMap,
    response::{Html, Redirect},
    routing::get,
    Extension, Form, Json, Router,
};
use std::sync::Arc;

/// Register all REST routes
///
/// The page is served under the configured slug and its forms post to the
/// configured options endpoint. A GET on the endpoint lists the sections,
/// so every path below it is free for section ids.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let page_path = service.config().page_path();
    let options_path = service.config().options_endpoint.clone();
    if !options_path.starts_with('/') {
        anyhow::bail!("options endpoint must be an absolute path: {}", options_path);
    }
    if page_path == options_path {
        anyhow::bail!("page slug collides with the options endpoint: {}", page_path);
    }

    let router = router
        // Page endpoints
        .route(&page_path, get(render_page_handler))
        .route(&options_path, get(list_sections_handler).post(save_options_handler))
        // Record endpoints
        .route(&format!("{}/{{section}}", options_path), get(get_option_record_handler))
        // Add service as extension for handlers
        .layer(Extension(service));

    Ok(router)
}

// ===== Handler wrappers that extract service from Extension =====

async fn render_page_handler(
    Extension(service): Extension<Arc<Service>>,
    headers: HeaderMap,
    query: Query<PageQuery>,
) -> Result<Html<String>, super::error::Problem> {
    handlers::render_page(service, headers, query).await
}

async fn save_options_handler(
    Extension(service): Extension<Arc<Service>>,
    form: Form<Vec<(String, String)>>,
) -> Result<Redirect, super::error::Problem> {
    handlers::save_options(service, form).await
}

async fn list_sections_handler(
    Extension(service): Extension<Arc<Service>>,
) -> Json<SectionsListResponse> {
    handlers::list_sections(service).await
}

async fn get_option_record_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<String>,
) -> Result<Json<OptionRecordDto>, super::error::Problem> {
    handlers::get_option_record(service, path).await
}
