//! Document extractor trait

use crate::error::Result;
use crate::types::ExtractedDocument;

/// Turns raw document bytes into ordered text
///
/// Implementations:
/// - `PdfExtractor`: lopdf with pdf-extract fallback
#[cfg_attr(test, mockall::automock)]
pub trait DocumentExtractor: Send + Sync {
    /// Extract pages of text from `data`
    ///
    /// CPU-bound; callers run it on the blocking pool.
    fn extract(&self, data: &[u8]) -> Result<ExtractedDocument>;
}
