//! Document, chunk and vector types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to an indexed vector
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key holding the chunk's original text
pub const TEXT_KEY: &str = "text";
/// Metadata key holding the chunk's position in its document
pub const CHUNK_INDEX_KEY: &str = "chunk_index";
/// Metadata key holding the ingestion identifier
pub const INGESTION_ID_KEY: &str = "ingestion_id";
/// Metadata key holding the uploaded filename
pub const SOURCE_KEY: &str = "source";

/// A run of text as reported by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    #[serde(rename = "str")]
    pub text: String,
}

impl TextItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One page of extracted content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// Page number (1-indexed)
    pub number: u32,
    /// Text items in reading order
    pub content: Vec<TextItem>,
}

impl ExtractedPage {
    /// Page text: items joined by a single space
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Ordered text content of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub pages: Vec<ExtractedPage>,
}

impl ExtractedDocument {
    /// Build a document from page strings, one text item per line
    pub fn from_page_texts<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| ExtractedPage {
                number: i as u32 + 1,
                content: page
                    .as_ref()
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(TextItem::new)
                    .collect(),
            })
            .collect();
        Self { pages }
    }

    /// True when no page carries any text item
    pub fn has_content(&self) -> bool {
        self.pages.iter().any(|page| !page.content.is_empty())
    }

    /// Full text: pages joined by a newline
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(ExtractedPage::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A bounded slice of normalized document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position within the document (0-indexed)
    pub index: usize,
    /// Character offset into the normalized text
    pub offset: usize,
    /// Chunk text
    pub text: String,
}

impl Chunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A vector ready to be written to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

impl IndexedVector {
    /// Build the vector for `chunk`, recording its text under [`TEXT_KEY`]
    pub fn from_chunk(
        ingestion_id: &Uuid,
        chunk: &Chunk,
        values: Vec<f32>,
        source: Option<&str>,
    ) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(TEXT_KEY.into(), chunk.text.clone().into());
        metadata.insert(CHUNK_INDEX_KEY.into(), chunk.index.into());
        metadata.insert(INGESTION_ID_KEY.into(), ingestion_id.to_string().into());
        if let Some(source) = source {
            metadata.insert(SOURCE_KEY.into(), source.into());
        }

        Self {
            id: format!("{}-{}", ingestion_id, chunk.index),
            values,
            metadata,
        }
    }

    /// Original chunk text, if present
    pub fn text(&self) -> Option<&str> {
        self.metadata.get(TEXT_KEY).and_then(|v| v.as_str())
    }
}

/// A similarity query hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    /// Higher is more similar; range depends on the index's metric
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Match {
    /// Original chunk text, if the index returned it
    pub fn text(&self) -> Option<&str> {
        self.metadata.get(TEXT_KEY).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_text_joins_items_and_pages() {
        let doc = ExtractedDocument {
            pages: vec![
                ExtractedPage {
                    number: 1,
                    content: vec![TextItem::new("Hello"), TextItem::new("world")],
                },
                ExtractedPage {
                    number: 2,
                    content: vec![TextItem::new("Second page")],
                },
            ],
        };
        assert_eq!(doc.text(), "Hello world\nSecond page");
        assert!(doc.has_content());
    }

    #[test]
    fn test_from_page_texts_skips_blank_lines() {
        let doc = ExtractedDocument::from_page_texts(["line one\n\n  line two  ", "   "]);
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].content.len(), 2);
        assert_eq!(doc.pages[1].number, 2);
        assert!(doc.pages[1].content.is_empty());
    }

    #[test]
    fn test_empty_document_has_no_content() {
        let doc = ExtractedDocument::from_page_texts(["", " \n "]);
        assert!(!doc.has_content());
    }

    #[test]
    fn test_indexed_vector_metadata() {
        let ingestion_id = Uuid::new_v4();
        let chunk = Chunk {
            index: 3,
            offset: 2400,
            text: "exact chunk text".into(),
        };
        let vector = IndexedVector::from_chunk(&ingestion_id, &chunk, vec![0.1, 0.2], Some("a.pdf"));

        assert_eq!(vector.id, format!("{}-3", ingestion_id));
        assert_eq!(vector.text(), Some("exact chunk text"));
        assert_eq!(vector.metadata[CHUNK_INDEX_KEY], 3);
        assert_eq!(vector.metadata[SOURCE_KEY], "a.pdf");
    }

    #[test]
    fn test_match_without_text() {
        let m = Match {
            id: "x".into(),
            score: 0.5,
            metadata: Metadata::new(),
        };
        assert_eq!(m.text(), None);
    }

    #[test]
    fn test_text_item_wire_name() {
        let item: TextItem = serde_json::from_str(r#"{"str":"abc"}"#).unwrap();
        assert_eq!(item.text, "abc");
    }
}
