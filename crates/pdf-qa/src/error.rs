//! Error types for the question answering backend

use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline and provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Backend errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required request field was absent
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The document extractor produced no pages or failed outright
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    /// Extracted text was empty once whitespace was normalized
    #[error("No text content could be extracted from the document")]
    NoContentExtracted,

    /// Embedding provider error
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    /// Vector index upsert error
    #[error("Vector index write failed: {0}")]
    IndexWriteFailed(String),

    /// Blank question
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// Vector index query error
    #[error("Vector index query failed: {0}")]
    QueryFailed(String),

    /// Completion provider error
    #[error("Completion failed: {0}")]
    CompletionFailed(String),

    /// A provider call exceeded its deadline on every attempt
    #[error("{provider} {operation} timed out after {}s", timeout.as_secs())]
    ProviderTimeout {
        provider: String,
        operation: String,
        timeout: Duration,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::ExtractionFailed(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingFailed(message.into())
    }

    /// Create an index write error
    pub fn index_write(message: impl Into<String>) -> Self {
        Self::IndexWriteFailed(message.into())
    }

    /// Create an index query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    /// Create a completion error
    pub fn completion(message: impl Into<String>) -> Self {
        Self::CompletionFailed(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True when the caller supplied bad input, as opposed to a downstream failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MissingField(_) | Error::EmptyQuestion)
    }

    /// HTTP status this error surfaces as
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
