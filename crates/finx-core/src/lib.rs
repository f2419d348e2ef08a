//! Core library for income-statement extraction.
//!
//! This crate provides:
//! - Rule-based extraction of income-statement line items from page text
//!   (alias matching, numeric token parsing, year column alignment)
//! - Document-wide currency and unit detection
//! - Statement data models with explicit confidence flags
//! - PDF text-layer extraction into traceable lines (`pdf` feature)

pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod statement;

pub use error::{FinxError, Result};
pub use models::config::FinxConfig;
pub use models::statement::{
    CanonicalItem, ConfidenceFlag, Currency, DocumentResult, FinancialFact, LinePosition,
    RawLine, Units, YearAxis, YearSlot,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use statement::{StatementExtractor, StatementParser};
