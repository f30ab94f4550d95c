//! Completion provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Generates text from a prompt
///
/// Implementations:
/// - `OpenAiCompletion`: OpenAI chat completions API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt` and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String>;
}
