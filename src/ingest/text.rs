// src/ingest/text.rs

use super::AttachmentDecoder;
use crate::error::Result;
use crate::llm::ContentBlock;

/// Plain text passes through verbatim. UTF-8 first; input that is not
/// valid UTF-8 is re-read as WINDOWS-1252 so legacy exports still ingest.
pub struct TextDecoder;

impl AttachmentDecoder for TextDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ContentBlock> {
        let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
        if !had_errors {
            return Ok(ContentBlock::text(text));
        }
        let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
        Ok(ContentBlock::text(text))
    }
}
