//! Retrieval-augmented answering

mod answer;

pub use answer::{AnswerPipeline, FALLBACK_ANSWER};
