//! Income-statement extraction module.

mod extractor;
pub mod rules;

pub use extractor::StatementParser;

use crate::models::statement::{DocumentResult, RawLine};

/// Trait for statement extractors.
///
/// Extraction never fails: unusable input yields an empty or low-confidence
/// result instead of an error.
pub trait StatementExtractor {
    /// Extract facts from ordered document lines.
    fn extract(&self, lines: &[RawLine]) -> DocumentResult;

    /// Extract facts from plain text (one page unless form feeds split it).
    fn extract_from_text(&self, text: &str) -> DocumentResult {
        self.extract(&RawLine::from_text(text))
    }
}
