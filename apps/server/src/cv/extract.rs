//! PDF text extraction backends.
//!
//! Two backends are tried in order: `pdf-extract` for the whole document,
//! then a page-by-page `lopdf` pass. A backend that errors hands off to the
//! next one. Empty text is a valid result: image-only PDFs have no text
//! layer, and no backend can do better without OCR.

use std::path::Path;

use anyhow::{anyhow, Result};

/// A single PDF-to-text strategy. Backends are tried in the order returned
/// by [`extraction_chain`] until one succeeds.
pub trait PdfTextExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extracts the full text of the document at `path`.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Primary backend: `pdf-extract` whole-document extraction.
pub struct PdfExtractBackend;

impl PdfTextExtractor for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        pdf_extract::extract_text(path)
            .map_err(|e| anyhow!("pdf-extract failed on {}: {e}", path.display()))
    }
}

/// Fallback backend: `lopdf`, extracting page by page and joining pages
/// with a blank line.
pub struct LopdfBackend;

impl PdfTextExtractor for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let document = lopdf::Document::load(path)
            .map_err(|e| anyhow!("lopdf failed to open {}: {e}", path.display()))?;

        let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        page_numbers.sort_unstable();

        let mut pages_text = Vec::with_capacity(page_numbers.len());
        for number in page_numbers {
            let text = document
                .extract_text(&[number])
                .map_err(|e| anyhow!("lopdf failed to extract page {number}: {e}"))?;
            pages_text.push(text);
        }

        Ok(pages_text.join("\n\n"))
    }
}

/// The backends in priority order.
pub fn extraction_chain() -> Vec<Box<dyn PdfTextExtractor>> {
    vec![Box::new(PdfExtractBackend), Box::new(LopdfBackend)]
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
