//! Document text decoding.
//!
//! The pipeline treats bytes-to-text decoding as a boundary: the
//! [`DocumentDecoder`] trait is what the orchestrator sees, and the lopdf
//! implementation below is what production uses. Tests substitute a
//! plain-text decoder.

use async_trait::async_trait;

/// Turns fetched document bytes into plain text.
#[async_trait]
pub trait DocumentDecoder: Send + Sync {
    async fn decode(&self, bytes: Vec<u8>) -> anyhow::Result<String>;
}

/// lopdf-backed decoder. Parsing is CPU-bound, so it runs on the blocking
/// pool.
pub struct PdfTextDecoder;

#[async_trait]
impl DocumentDecoder for PdfTextDecoder {
    async fn decode(&self, bytes: Vec<u8>) -> anyhow::Result<String> {
        tokio::task::spawn_blocking(move || extract_pdf_text(&bytes)).await?
    }
}

/// Extract plain text from every page of a PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> anyhow::Result<String> {
    let doc = lopdf::Document::load_mem(bytes)?;

    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        anyhow::bail!("document has no pages");
    }

    Ok(doc.extract_text(&pages)?)
}
