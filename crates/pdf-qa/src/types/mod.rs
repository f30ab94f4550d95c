//! Core data types for ingestion and answering

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ExtractedDocument, ExtractedPage, IndexedVector, Match, Metadata, TextItem};
pub use query::{AskQuestionRequest, VectorQuery};
pub use response::{Answer, IngestReport};
