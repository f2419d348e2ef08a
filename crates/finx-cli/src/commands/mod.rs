//! Subcommands and the input handling they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::Path;

use tracing::debug;

use finx_core::models::config::FinxConfig;
use finx_core::pdf::{PdfExtractor, PdfProcessor};
use finx_core::{DocumentResult, RawLine, StatementExtractor, StatementParser};

/// File extensions accepted as input.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// Load the config file given with `-c`, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FinxConfig> {
    match config_path {
        Some(path) => Ok(FinxConfig::from_file(Path::new(path))?),
        None => Ok(FinxConfig::default()),
    }
}

/// Lower-cased extension of a path.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Read a PDF or text file into ordered lines.
pub fn read_lines(path: &Path, config: &FinxConfig) -> anyhow::Result<Vec<RawLine>> {
    let extension = extension_of(path);
    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::with_config(&config.pdf);
            extractor.load(&data)?;
            debug!("PDF has {} pages", extractor.page_count());
            Ok(extractor.extract_lines()?)
        }
        "txt" => {
            let text = fs::read_to_string(path)?;
            Ok(RawLine::from_text(&text))
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Read a file and extract its income statement.
pub fn extract_file(path: &Path, config: &FinxConfig) -> anyhow::Result<DocumentResult> {
    let lines = read_lines(path, config)?;
    let parser = StatementParser::from_config(&config.extraction);
    Ok(parser.extract(&lines))
}
