//! Companion endpoint: render the first referenced document of a page.
//!
//! Rasterization itself is an external service. This handler only locates
//! the first PDF link on the given page, hands its absolute address to the
//! configured rasterizer, and relays the rendered image.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;
use url::Url;

use yakulex_common::error::ApiError;
use yakulex_extraction::listing;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(rename = "websiteUrl")]
    pub website_url: Url,
}

/// POST /api/render - fetch the page, find its first PDF link, return the
/// rasterizer's image for it.
pub async fn render_first_document(
    State(state): State<SharedState>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, ApiError> {
    let Some(rasterizer) = &state.rasterizer_url else {
        return Err(ApiError::NotConfigured(
            "no rasterizer service configured".to_string(),
        ));
    };

    let page = state
        .http
        .fetch(req.website_url.as_str())
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    let html = String::from_utf8_lossy(&page);

    let Some(document_url) = listing::first_document_link(&html, &req.website_url) else {
        return Err(ApiError::NotFound("page has no document link".to_string()));
    };
    info!(page = %req.website_url, document = %document_url, "rendering first document");

    // Opaque render(address) -> image call.
    let mut render_url = rasterizer.clone();
    render_url
        .query_pairs_mut()
        .append_pair("address", document_url.as_str());
    let image = state
        .http
        .fetch(render_url.as_str())
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], image).into_response())
}
