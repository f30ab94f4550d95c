//! Ingestion pipeline: extract → normalize + chunk → embed → upsert

use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{DocumentExtractor, EmbeddingProvider, VectorIndex};
use crate::types::{IndexedVector, IngestReport};

use super::chunker::TextChunker;

/// An uploaded document
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename, when the client sent one
    pub filename: Option<String>,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename,
            data: data.into(),
        }
    }
}

/// Turns uploaded documents into indexed vectors
///
/// Not idempotent: ingesting the same document twice writes a second set of
/// vectors under fresh identifiers.
pub struct IngestPipeline {
    extractor: Arc<dyn DocumentExtractor>,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    upsert_batch_size: usize,
}

impl IngestPipeline {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            extractor,
            chunker,
            embedder,
            index,
            upsert_batch_size: 100,
        }
    }

    /// Cap the number of vectors sent per upsert request
    pub fn with_upsert_batch_size(mut self, size: usize) -> Self {
        self.upsert_batch_size = size.max(1);
        self
    }

    /// Ingest one document.
    ///
    /// Upserts go out in batches; if a later batch fails, earlier batches stay
    /// written and the call reports `IndexWriteFailed`.
    pub async fn ingest(&self, upload: Upload) -> Result<IngestReport> {
        let start = Instant::now();
        let ingestion_id = Uuid::new_v4();
        let filename = upload.filename.clone();
        let label = filename.as_deref().unwrap_or("<unnamed>");

        tracing::info!("[{}] Extracting text ({} bytes)", label, upload.data.len());
        let extractor = Arc::clone(&self.extractor);
        let data = upload.data;
        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&data))
            .await
            .map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))??;

        if extracted.pages.is_empty() || !extracted.has_content() {
            return Err(Error::extraction("Document contains no text content"));
        }

        let chunks = self.chunker.chunk(&extracted.text())?;
        tracing::info!(
            "[{}] {} pages, {} chunks, generating embeddings...",
            label,
            extracted.pages.len(),
            chunks.len()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_many(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let vectors: Vec<IndexedVector> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| {
                IndexedVector::from_chunk(&ingestion_id, chunk, values, filename.as_deref())
            })
            .collect();

        for (batch_num, batch) in vectors.chunks(self.upsert_batch_size).enumerate() {
            if let Err(e) = self.index.upsert(batch).await {
                tracing::error!(
                    "[{}] Upsert batch {} failed after {} of {} vectors were written",
                    label,
                    batch_num + 1,
                    batch_num * self.upsert_batch_size,
                    vectors.len()
                );
                return Err(e);
            }
        }

        tracing::info!(
            "[{}] Indexed {} chunks in {}ms (ingestion {})",
            label,
            vectors.len(),
            start.elapsed().as_millis(),
            ingestion_id
        );

        Ok(IngestReport {
            ingestion_id,
            chunk_count: vectors.len(),
        })
    }
}
