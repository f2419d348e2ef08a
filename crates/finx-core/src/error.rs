//! Error types for the finx-core library.
//!
//! Extraction itself never fails: malformed text degrades to `Missing` or
//! `LowConfidence` facts. These errors cover the surrounding I/O only.

use thiserror::Error;

/// Main error type for the finx library.
#[derive(Error, Debug)]
pub enum FinxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF has no usable text layer.
    #[error("no text could be extracted; the PDF may be scanned/image-based")]
    NoText,
}

/// Result type for the finx library.
pub type Result<T> = std::result::Result<T, FinxError>;
