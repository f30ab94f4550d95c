//! Pipeline results and HTTP response bodies

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of ingesting one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Identifier shared by every vector written in this ingestion
    pub ingestion_id: Uuid,
    /// Number of chunks embedded and upserted
    pub chunk_count: usize,
}

/// Outcome of answering one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Completion text, or the fixed fallback when nothing matched
    pub text: String,
    /// Number of retrieved chunks that went into the context
    pub context_chunks: usize,
}

impl Answer {
    /// Whether the answer is the no-match fallback
    pub fn is_fallback(&self) -> bool {
        self.context_chunks == 0
    }
}

/// `{ "message": ... }` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of a successful `POST /upload-document`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Number of chunks indexed
    pub chunk_count: usize,
}

/// Body of a successful `POST /ask-question`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// `{ "error": ... }` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
