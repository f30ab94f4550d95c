//! Question answering over retrieved chunks

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{CompletionProvider, EmbeddingProvider, VectorIndex};
use crate::types::{Answer, VectorQuery};

/// Returned instead of calling the completion model when retrieval finds nothing
pub const FALLBACK_ANSWER: &str =
    "I could not find any relevant information in the indexed documents to answer that question.";

/// Embed question → query index → assemble context → prompt → complete
pub struct AnswerPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    completion: Arc<dyn CompletionProvider>,
    top_k: usize,
}

impl AnswerPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        completion: Arc<dyn CompletionProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            completion,
            top_k: top_k.max(1),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `question` from the indexed documents
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(Error::EmptyQuestion);
        }

        let start = Instant::now();
        tracing::info!("Question: \"{}\"", question);

        let question_embedding = self.embedder.embed_one(question).await?;

        let matches = self
            .index
            .query(&VectorQuery::new(question_embedding, self.top_k))
            .await?;
        tracing::debug!(matches = matches.len(), "vector index query complete");

        let usable = matches.iter().filter(|m| m.text().is_some()).count();
        if usable == 0 {
            tracing::info!(
                "No matching chunks ({} raw matches), returning fallback answer",
                matches.len()
            );
            return Ok(Answer {
                text: FALLBACK_ANSWER.to_string(),
                context_chunks: 0,
            });
        }

        let context = PromptBuilder::build_context(&matches);
        let prompt = PromptBuilder::build_qa_prompt(&context, question);

        let text = self.completion.complete(&prompt).await?;

        tracing::info!(
            "Answered in {}ms from {} chunks",
            start.elapsed().as_millis(),
            usable
        );

        Ok(Answer {
            text,
            context_chunks: usable,
        })
    }
}
