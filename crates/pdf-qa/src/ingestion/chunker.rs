//! Fixed-window text chunking with overlap

use crate::error::{Error, Result};
use crate::types::Chunk;

use super::normalize::normalize_whitespace;

/// Splits normalized text into overlapping windows of at most `chunk_size` characters.
///
/// Sizes are counted in `char`s, so multi-byte text is never split inside a code
/// point. Every chunk after the first starts `overlap` characters before the end
/// of the previous one. Only the final chunk may be shorter than `chunk_size`.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; requires `chunk_size > overlap`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk size must be greater than zero".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Normalize `text` and split it into chunks.
    ///
    /// Fails with [`Error::NoContentExtracted`] when nothing but whitespace remains.
    pub fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Err(Error::NoContentExtracted);
        }
        Ok(self.split(&normalized))
    }

    /// Window already-normalized text
    fn split(&self, text: &str) -> Vec<Chunk> {
        // Byte offset of every char boundary, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;

        let mut chunks = Vec::with_capacity(char_count / (self.chunk_size - self.overlap) + 1);
        let mut start = 0usize;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(Chunk {
                index: chunks.len(),
                offset: start,
                text: text[boundaries[start]..boundaries[end]].to_string(),
            });

            if end == char_count {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}
