//! pdf-qa: PDF ingestion and grounded question answering over a hosted vector index
//!
//! Uploaded PDFs are extracted, normalized, chunked, embedded and upserted into a
//! vector index. Questions are embedded, matched against the index, and answered by
//! a completion model that is instructed to use only the retrieved chunks.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use ingestion::{IngestPipeline, TextChunker};
pub use retrieval::AnswerPipeline;
pub use types::{
    document::{Chunk, ExtractedDocument, IndexedVector, Match},
    response::{Answer, IngestReport},
};
