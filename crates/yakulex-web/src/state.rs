//! Shared application state for the web server.

use std::sync::Arc;

use url::Url;

use yakulex_common::http::RetryingClient;
use yakulex_extraction::pipeline::ExtractionPipeline;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExtractionPipeline>,
    /// Plain transport for the companion render endpoint.
    pub http: RetryingClient,
    /// External rasterizer service, when configured.
    pub rasterizer_url: Option<Url>,
}

pub type SharedState = Arc<AppState>;
