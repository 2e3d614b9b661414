//! yakulex-web — HTTP surface for the extraction pipeline.
//! Exposes:
//!   - POST /api/search          — provisional match (fast phase)
//!   - POST /api/search/status   — background extraction poll
//!   - POST /api/render          — first-document rasterization relay

pub mod handlers;
pub mod router;
pub mod state;
