use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures of the outbound HTTP layer.
///
/// Only `Timeout` is retryable; everything else propagates to the caller
/// unchanged.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("retries exhausted for {url} after {attempts} timeouts")]
    Exhausted { url: String, attempts: u32 },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum YakulexError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("job expired: {0}")]
    Expired(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, YakulexError>;

/// Error type returned by web handlers. Maps the taxonomy onto the small
/// fixed set of HTTP outcomes the service exposes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Gone(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("{0}")]
    NotConfigured(String),

    #[error("server error: {0}")]
    Internal(String),
}

impl From<YakulexError> for ApiError {
    fn from(err: YakulexError) -> Self {
        match err {
            YakulexError::NotFound(msg) => ApiError::NotFound(msg),
            YakulexError::Expired(msg) => ApiError::Gone(msg),
            YakulexError::Transport(e) => ApiError::Upstream(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
