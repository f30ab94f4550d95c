//! Vector index trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexedVector, Match, VectorQuery};

/// Nearest-neighbor store over (id, vector, metadata) tuples
///
/// Implementations:
/// - `PineconeIndex`: hosted Pinecone index
/// - `MemoryIndex`: process-local cosine index
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite vectors by id
    async fn upsert(&self, vectors: &[IndexedVector]) -> Result<()>;

    /// Return up to `query.top_k` matches, most similar first
    async fn query(&self, query: &VectorQuery) -> Result<Vec<Match>>;
}
