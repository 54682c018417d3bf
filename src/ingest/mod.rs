// src/ingest/mod.rs
// Attachment ingestion: one uploaded file in, one normalized content block
// out. Decoders are looked up by declared MIME type in a registry, so new
// formats are added by registration rather than by editing a branch chain.

mod docx;
mod image;
mod pdf;
mod text;

pub use docx::DocxDecoder;
pub use image::ImageDecoder;
pub use pdf::PdfDecoder;
pub use text::TextDecoder;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, TutorError};
use crate::llm::ContentBlock;

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

/// An uploaded file as the presentation layer hands it over.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: Option<String>,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Converts one attachment's raw bytes into a normalized content block.
pub trait AttachmentDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<ContentBlock>;
}

pub struct Ingestor {
    decoders: HashMap<String, Box<dyn AttachmentDecoder>>,
    max_bytes: usize,
}

impl Ingestor {
    /// Registry with the built-in formats: PNG/JPEG images, PDF, DOCX,
    /// plain text.
    pub fn new(max_bytes: usize) -> Self {
        let mut ingestor = Self {
            decoders: HashMap::new(),
            max_bytes,
        };
        ingestor.register(MIME_PNG, ImageDecoder);
        ingestor.register(MIME_JPEG, ImageDecoder);
        ingestor.register(MIME_PDF, PdfDecoder);
        ingestor.register(MIME_DOCX, DocxDecoder);
        ingestor.register(MIME_TEXT, TextDecoder);
        ingestor
    }

    pub fn register(&mut self, mime: &str, decoder: impl AttachmentDecoder + 'static) {
        self.decoders.insert(mime.to_string(), Box::new(decoder));
    }

    /// Convert an optional upload into an optional content block.
    ///
    /// No upload and unsupported types are both "no attachment", not
    /// errors; malformed or oversize bytes of a supported type are.
    pub fn ingest(&self, upload: Option<&Upload>) -> Result<Option<ContentBlock>> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        if upload.bytes.len() > self.max_bytes {
            return Err(TutorError::AttachmentDecode(format!(
                "attachment of {} bytes exceeds the {} byte limit",
                upload.bytes.len(),
                self.max_bytes
            )));
        }

        let mime = self.resolve_mime(upload);
        match self.decoders.get(&mime) {
            Some(decoder) => decoder.decode(&upload.bytes).map(Some),
            None => {
                debug!(mime = %mime, "unsupported attachment type, treating as no attachment");
                Ok(None)
            }
        }
    }

    /// Normalize the declared type (lowercase, parameters stripped). An
    /// opaque or missing declaration falls back to guessing from the
    /// filename extension.
    fn resolve_mime(&self, upload: &Upload) -> String {
        let declared = upload
            .mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if !declared.is_empty() && declared != "application/octet-stream" {
            return declared;
        }
        upload
            .name
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first_raw())
            .map(|guess| guess.to_ascii_lowercase())
            .unwrap_or(declared)
    }
}
