//! PDF text extraction

use crate::error::{Error, Result};
use crate::providers::DocumentExtractor;
use crate::types::ExtractedDocument;

/// Page separator emitted by pdf-extract
const FORM_FEED: char = '\u{c}';

/// PDF extractor backed by lopdf, with pdf-extract as fallback
///
/// lopdf gives page-by-page text. When it cannot load the file or yields no
/// text at all, pdf-extract gets a second try on the whole document.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Page-by-page extraction using lopdf
    fn extract_pages(data: &[u8]) -> Result<ExtractedDocument> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(format!("Failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    tracing::debug!("Could not extract text for page {}: {}", page_num, e);
                    texts.push(String::new());
                }
            }
        }

        Ok(ExtractedDocument::from_page_texts(texts))
    }

    /// Whole-document extraction using pdf-extract
    fn extract_fallback(data: &[u8]) -> Result<ExtractedDocument> {
        // pdf-extract panics on some malformed fonts
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
            .map_err(|_| Error::extraction("pdf-extract panicked while reading the document"))?
            .map_err(|e| Error::extraction(format!("pdf-extract failed: {}", e)))?;

        Ok(ExtractedDocument::from_page_texts(
            text.split(FORM_FEED).collect::<Vec<_>>(),
        ))
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, data: &[u8]) -> Result<ExtractedDocument> {
        if data.is_empty() {
            return Err(Error::extraction("Uploaded document is empty"));
        }

        let primary = match Self::extract_pages(data) {
            Ok(doc) if doc.has_content() => return Ok(doc),
            Ok(_) => {
                tracing::warn!("lopdf found no text, trying pdf-extract");
                None
            }
            Err(e) => {
                tracing::warn!("lopdf failed: {}, trying pdf-extract", e);
                Some(e)
            }
        };

        match Self::extract_fallback(data) {
            Ok(doc) if doc.has_content() => Ok(doc),
            Ok(_) => Err(Error::extraction(
                "PDF has no extractable text; it may be image-based or encrypted",
            )),
            Err(fallback) => Err(primary.unwrap_or(fallback)),
        }
    }
}
