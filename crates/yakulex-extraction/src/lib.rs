//! yakulex-extraction — Keyword-bounded excerpt mining from regulatory review documents.
//! Covers the whole pipeline:
//! - Structural match of the listing row (label → table → document links)
//! - Retried document fetching
//! - PDF text decoding
//! - Keyword-bounded excerpt extraction
//! - Two-phase job store (provisional answer, background fill, polling)

pub mod config;
pub mod excerpt;
pub mod listing;
pub mod models;
pub mod pdf_text;
pub mod pipeline;
pub mod store;
