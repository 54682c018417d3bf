// src/ingest/pdf.rs

use tracing::debug;

use super::AttachmentDecoder;
use crate::error::{Result, TutorError};
use crate::llm::ContentBlock;

/// Extracts per-page text and concatenates it under literal `Page N:`
/// headers. Pages with no extractable text keep their header with an empty
/// body so page numbering stays intact.
pub struct PdfDecoder;

impl AttachmentDecoder for PdfDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ContentBlock> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| TutorError::AttachmentDecode(format!("invalid PDF data: {e}")))?;
        if doc.is_encrypted() {
            return Err(TutorError::AttachmentDecode(
                "PDF is password protected".to_string(),
            ));
        }

        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| TutorError::AttachmentDecode(format!("PDF text extraction failed: {e}")))?;

        debug!(pages = pages.len(), "PDF attachment extracted");

        let segments: Vec<String> = pages
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let text = raw.trim();
                if text.is_empty() {
                    format!("Page {}:", i + 1)
                } else {
                    format!("Page {}:\n{}", i + 1, text)
                }
            })
            .collect();

        Ok(ContentBlock::text(segments.join("\n")))
    }
}
