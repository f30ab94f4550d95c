//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::{AppConfig, VectorBackend};
use crate::error::Result;
use crate::ingestion::{IngestPipeline, PdfExtractor, TextChunker};
use crate::providers::{
    CompletionProvider, EmbeddingProvider, MemoryIndex, OpenAiClient, OpenAiCompletion,
    OpenAiEmbedder, PineconeIndex, RetryPolicy, VectorIndex,
};
use crate::retrieval::AnswerPipeline;

/// Shared application state
///
/// Holds only immutable configuration and the two pipelines; the documents
/// themselves live in the vector index.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    ingest: IngestPipeline,
    answer: AnswerPipeline,
}

impl AppState {
    /// Assemble state from already-built pipelines
    pub fn new(config: AppConfig, ingest: IngestPipeline, answer: AnswerPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                ingest,
                answer,
            }),
        }
    }

    /// Build providers and pipelines from configuration
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        tracing::info!(
            "Initializing application state (vector backend: {:?})",
            config.vector_index.backend
        );

        let retry = RetryPolicy::from_config(&config.retry);

        let client = Arc::new(OpenAiClient::new(&config.openai, retry.clone())?);
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OpenAiEmbedder::new(Arc::clone(&client), &config.openai));
        let completion: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiCompletion::new(client, &config.openai));
        tracing::info!(
            "OpenAI providers ready (embeddings: {}, completion: {})",
            config.openai.embedding_model,
            config.openai.completion_model
        );

        let index: Arc<dyn VectorIndex> = match config.vector_index.backend {
            VectorBackend::Pinecone => {
                Arc::new(PineconeIndex::connect(&config.vector_index, retry).await?)
            }
            VectorBackend::Memory => {
                tracing::warn!("Using in-memory vector index; contents are lost on restart");
                Arc::new(MemoryIndex::new())
            }
        };

        let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;
        let ingest = IngestPipeline::new(
            Arc::new(PdfExtractor::new()),
            chunker,
            Arc::clone(&embedder),
            Arc::clone(&index),
        )
        .with_upsert_batch_size(config.vector_index.upsert_batch_size);

        let answer = AnswerPipeline::new(embedder, index, completion, config.retrieval.top_k);

        Ok(Self::new(config, ingest, answer))
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the ingestion pipeline
    pub fn ingest(&self) -> &IngestPipeline {
        &self.inner.ingest
    }

    /// Get the question answering pipeline
    pub fn answer(&self) -> &AnswerPipeline {
        &self.inner.answer
    }
}
