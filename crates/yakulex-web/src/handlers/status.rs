//! Poll endpoint for background extraction status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use yakulex_common::error::ApiError;
use yakulex_extraction::models::{MatchResult, PollOutcome};

use crate::handlers::search::SearchRequest;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(rename = "matchedContent")]
    pub matched_content: MatchResult,
    pub complete: bool,
}

/// POST /api/search/status - report a job's state: 200 with the full record
/// once every excerpt is set, 202 while extraction is still running.
pub async fn search_status(
    State(state): State<SharedState>,
    Json(req): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    match state.pipeline.poll(&req.query, &req.target_label).await? {
        PollOutcome::Completed(result) => Ok((
            StatusCode::OK,
            Json(StatusResponse {
                matched_content: result,
                complete: true,
            }),
        )
            .into_response()),
        PollOutcome::InProgress => Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "message": "extraction in progress" })),
        )
            .into_response()),
    }
}
