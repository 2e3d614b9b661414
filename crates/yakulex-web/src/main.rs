//! Yakulex Web Server
//!
//! Run with: cargo run -p yakulex-web

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use yakulex_common::http::RetryingClient;
use yakulex_extraction::config::PipelineConfig;
use yakulex_extraction::pdf_text::PdfTextDecoder;
use yakulex_extraction::pipeline::ExtractionPipeline;
use yakulex_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PipelineConfig::from_env()?;
    let transport = RetryingClient::over_http(&config.http, config.retry.clone())?;

    let rasterizer_url = match std::env::var("YAKULEX_RASTERIZER_URL") {
        Ok(v) => Some(url::Url::parse(&v)?),
        Err(_) => None,
    };

    info!(listing = %config.listing_url, "Starting Yakulex server");

    let pipeline = ExtractionPipeline::new(transport.clone(), Arc::new(PdfTextDecoder), config);
    let state = AppState {
        pipeline: Arc::new(pipeline),
        http: transport,
        rasterizer_url,
    };
    let app = yakulex_web::router::build_router(state);

    let port = std::env::var("YAKULEX_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
