//! Embedded-text extraction for PDF receipts.
//!
//! Digital receipts arrive as PDFs with selectable text; those skip OCR
//! entirely and feed the structured extractor directly.

use tracing::debug;

use crate::error::PdfError;

/// Extract embedded text from PDF bytes.
///
/// An empty result is not an error, matching the OCR contract; a PDF
/// that cannot be parsed at all fails with [`PdfError::Parse`].
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    debug!("Extracted {} chars of embedded PDF text", text.len());
    Ok(text)
}
