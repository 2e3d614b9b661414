//! Axum router — maps URL paths to handlers.

use std::sync::Arc;

use axum::{routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{render::render_first_document, search::search, status::search_status};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/search", post(search))
        .route("/api/search/status", post(search_status))
        .route("/api/render", post(render_first_document))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
