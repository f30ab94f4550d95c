//! Provider abstractions for extraction, embeddings, vector storage and completion
//!
//! The pipelines depend only on these traits; concrete clients are built once at
//! startup and injected.

pub mod completion;
pub mod document;
pub mod embedding;
pub mod memory;
pub mod openai;
pub mod pinecone;
pub mod retry;
pub mod vector_index;

pub use completion::CompletionProvider;
pub use document::DocumentExtractor;
pub use embedding::EmbeddingProvider;
pub use memory::MemoryIndex;
pub use openai::{OpenAiClient, OpenAiCompletion, OpenAiEmbedder};
pub use pinecone::PineconeIndex;
pub use retry::{CallError, RetryPolicy};
pub use vector_index::VectorIndex;
