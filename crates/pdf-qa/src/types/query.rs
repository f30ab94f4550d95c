//! Request types

use serde::{Deserialize, Serialize};

/// Body of `POST /ask-question`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskQuestionRequest {
    /// The question; absent and blank are both rejected
    #[serde(default)]
    pub question: Option<String>,
}

/// Nearest-neighbor query against a vector index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQuery {
    /// Query embedding
    pub vector: Vec<f32>,
    /// Maximum number of matches to return
    pub top_k: usize,
    /// Whether stored metadata should accompany each match
    pub include_metadata: bool,
}

impl VectorQuery {
    /// Query for the `top_k` nearest vectors, with metadata
    pub fn new(vector: Vec<f32>, top_k: usize) -> Self {
        Self {
            vector,
            top_k,
            include_metadata: true,
        }
    }
}
