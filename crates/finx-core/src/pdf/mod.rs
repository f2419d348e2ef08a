//! PDF text-layer input.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Text of each page in page order.
    fn page_texts(&self) -> Result<Vec<String>>;
}
