//! Listing search — the fast provisional phase.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use yakulex_common::error::ApiError;
use yakulex_extraction::models::MatchResult;

use crate::state::SharedState;

/// Request body. Field names match the frontend contract this service was
/// built against.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Label of the listing row to match.
    #[serde(rename = "localResult")]
    pub target_label: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "matchedContent")]
    pub matched_content: MatchResult,
}

/// POST /api/search - match the listing row and answer with provisional
/// references; excerpt extraction continues in the background.
pub async fn search(
    State(state): State<SharedState>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let matched = state
        .pipeline
        .initiate(&req.query, &req.target_label)
        .await?;

    Ok(Json(SearchResponse {
        matched_content: matched,
    }))
}
