// src/ingest/image.rs

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tracing::debug;

use super::AttachmentDecoder;
use crate::error::{Result, TutorError};
use crate::llm::{ContentBlock, ImageDetail};

/// Decodes any supported bitmap format and normalizes it: re-encode as PNG,
/// base64-encode, and ship with a fixed high-detail hint.
pub struct ImageDecoder;

impl AttachmentDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ContentBlock> {
        let bitmap = image::load_from_memory(bytes)
            .map_err(|e| TutorError::AttachmentDecode(format!("invalid image data: {e}")))?;

        let mut png = Vec::new();
        bitmap
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| TutorError::AttachmentDecode(format!("PNG re-encode failed: {e}")))?;

        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            png_bytes = png.len(),
            "image attachment normalized"
        );

        Ok(ContentBlock::Image {
            encoded: BASE64.encode(&png),
            mime: "image/png".to_string(),
            detail: ImageDetail::High,
        })
    }
}
