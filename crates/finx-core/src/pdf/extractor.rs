//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;
use crate::models::statement::RawLine;

/// PDF text extractor.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    max_pages: usize,
    min_text_length: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self::with_config(&PdfConfig::default())
    }

    /// Create an extractor with page and text limits from configuration.
    pub fn with_config(config: &PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            max_pages: config.max_pages,
            min_text_length: config.min_text_length,
        }
    }

    /// Ordered lines of the loaded document with page/line positions.
    ///
    /// Fails with [`PdfError::NoText`] when the text layer is empty or too
    /// short to hold a statement.
    pub fn extract_lines(&self) -> Result<Vec<RawLine>> {
        let pages = self.page_texts()?;

        let text_len: usize = pages.iter().map(|p| p.trim().chars().count()).sum();
        if text_len < self.min_text_length.max(1) {
            warn!(
                "PDF text layer has {} characters; minimum is {}",
                text_len, self.min_text_length
            );
            return Err(PdfError::NoText);
        }

        let lines = RawLine::from_pages(&pages);
        debug!("Extracted {} lines from {} pages", lines.len(), pages.len());
        Ok(lines)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Honors the configured page limit.
    fn page_texts(&self) -> Result<Vec<String>> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        let mut pages = pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        if self.max_pages > 0 && pages.len() > self.max_pages {
            debug!("Reading first {} of {} pages", self.max_pages, pages.len());
            pages.truncate(self.max_pages);
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert_eq!(extractor.min_text_length, 20);
    }

    #[test]
    fn test_nothing_loaded() {
        let extractor = PdfExtractor::new();
        assert!(matches!(extractor.extract_lines(), Err(PdfError::Parse(_))));
        assert!(matches!(extractor.page_texts(), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let mut extractor = PdfExtractor::new();
        let err = extractor.load(b"Revenue 45,000 42,000").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_with_config() {
        let config = PdfConfig {
            max_pages: 3,
            min_text_length: 100,
        };
        let extractor = PdfExtractor::with_config(&config);
        assert_eq!(extractor.max_pages, 3);
        assert_eq!(extractor.min_text_length, 100);
    }
}
