//! Data models for statement extraction.

pub mod config;
pub mod statement;

pub use config::{ExtractionConfig, FinxConfig, OutputConfig, PdfConfig};
pub use statement::*;
