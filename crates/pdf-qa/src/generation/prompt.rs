//! Prompt templates for retrieval-augmented answering

use crate::types::Match;

/// Separator placed between retrieved chunks in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Prompt builder for grounded question answering
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join the stored text of each match, in the order the index returned them.
    ///
    /// Matches without stored text are skipped.
    pub fn build_context(matches: &[Match]) -> String {
        matches
            .iter()
            .filter_map(|m| {
                let text = m.text();
                if text.is_none() {
                    tracing::warn!("Match {} has no stored text, skipping", m.id);
                }
                text
            })
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Build the answering prompt with strict grounding
    pub fn build_qa_prompt(context: &str, question: &str) -> String {
        format!(
            r#"You are a helpful assistant that answers questions about the user's documents.
Answer the question using ONLY the information in the context below.
If the context does not contain enough information to answer, say that the provided documents do not contain the answer. Do not make up an answer or use outside knowledge.

Context:
{context}

Question: {question}

Answer:"#,
            context = context,
            question = question
        )
    }
}
