//! Document ingestion: extraction, normalization, chunking, embedding and upsert

mod chunker;
mod extractor;
mod normalize;
mod pipeline;

pub use chunker::TextChunker;
pub use extractor::PdfExtractor;
pub use normalize::normalize_whitespace;
pub use pipeline::{IngestPipeline, Upload};
