// src/ingest/docx.rs

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use super::AttachmentDecoder;
use crate::error::{Result, TutorError};
use crate::llm::ContentBlock;

/// Extracts paragraph text from a DOCX archive in document order, one line
/// per paragraph. Tables, headers, and footers are not extracted.
pub struct DocxDecoder;

impl AttachmentDecoder for DocxDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<ContentBlock> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| TutorError::AttachmentDecode(format!("invalid DOCX archive: {e}")))?;

        let mut xml = Vec::new();
        archive
            .by_name("word/document.xml")
            .map_err(|_| {
                TutorError::AttachmentDecode("DOCX archive has no word/document.xml".to_string())
            })?
            .read_to_end(&mut xml)
            .map_err(|e| TutorError::AttachmentDecode(format!("unreadable DOCX entry: {e}")))?;

        let paragraphs = extract_paragraphs(&xml)?;
        debug!(paragraphs = paragraphs.len(), "DOCX attachment extracted");

        Ok(ContentBlock::text(paragraphs.join("\n")))
    }
}

/// Walk the document XML, concatenating `w:t` runs within each `w:p`
/// paragraph. Empty paragraphs keep their (empty) line.
fn extract_paragraphs(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = true;
                }
            }
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e.unescape().map_err(|err| {
                        TutorError::AttachmentDecode(format!("DOCX text decode error: {err}"))
                    })?;
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = false;
                }
                if e.name().as_ref() == b"w:p" {
                    paragraphs.push(std::mem::take(&mut current));
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"w:p" {
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TutorError::AttachmentDecode(format!(
                    "DOCX XML parse error: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t> world</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Second &amp; final</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_paragraphs_join_in_document_order() {
        let bytes = build_docx(SAMPLE);
        let block = DocxDecoder.decode(&bytes).unwrap();
        assert_eq!(block, ContentBlock::text("Hello world\n\nSecond & final"));
    }

    #[test]
    fn test_runs_concatenate_without_separator() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:t>fu</w:t></w:r><w:r><w:t>sed</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let paragraphs = extract_paragraphs(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs, vec!["fused"]);
    }

    #[test]
    fn test_archive_without_document_xml_is_an_error() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("word/other.xml", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        match DocxDecoder.decode(&cursor.into_inner()) {
            Err(TutorError::AttachmentDecode(msg)) => {
                assert!(msg.contains("word/document.xml"));
            }
            other => panic!("expected AttachmentDecode, got {other:?}"),
        }
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        match DocxDecoder.decode(b"plain bytes, no archive") {
            Err(TutorError::AttachmentDecode(msg)) => assert!(msg.contains("invalid DOCX")),
            other => panic!("expected AttachmentDecode, got {other:?}"),
        }
    }
}
