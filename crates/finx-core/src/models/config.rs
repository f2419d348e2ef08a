//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FinxError, Result};
use crate::statement::rules::NumberLocale;

/// Main configuration for the finx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinxConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Statement extraction configuration.
    pub extraction: ExtractionConfig,

    /// Tabular output configuration.
    pub output: OutputConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Minimum text length to consider the PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            min_text_length: 20,
        }
    }
}

/// Statement extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Earliest plausible fiscal year.
    pub min_year: i32,

    /// Latest plausible fiscal year.
    pub max_year: i32,

    /// Maximum number of year columns kept on the axis.
    pub max_years: usize,

    /// Thousands separator convention for numeric tokens.
    pub number_locale: NumberLocale,

    /// Drop bare year tokens found among a row's values.
    pub drop_year_tokens_in_rows: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: 2100,
            max_years: 5,
            number_locale: NumberLocale::Comma,
            drop_year_tokens_in_rows: true,
        }
    }
}

/// Tabular output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Text written in the Value column when a fact has no value.
    pub null_value: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            null_value: "NULL".to_string(),
        }
    }
}

impl FinxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the extractor cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.min_year > self.extraction.max_year {
            return Err(FinxError::Config(format!(
                "min_year ({}) is after max_year ({})",
                self.extraction.min_year, self.extraction.max_year
            )));
        }
        if self.extraction.max_years == 0 {
            return Err(FinxError::Config(
                "max_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
