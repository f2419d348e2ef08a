//! Process command - extract the income statement from a single file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use finx_core::models::config::OutputConfig;
use finx_core::{DocumentResult, StatementExtractor, StatementParser};

use super::{extension_of, load_config, read_lines, SUPPORTED_EXTENSIONS};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Print extraction warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// One row per fact
    Csv,
    /// Full document result
    Json,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = extension_of(&args.input);
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading text...");
    pb.set_position(10);
    let lines = read_lines(&args.input, &config)?;
    debug!("Read {} lines", lines.len());

    pb.set_message("Extracting statement...");
    pb.set_position(60);
    let result = StatementParser::from_config(&config.extraction).extract(&lines);

    pb.finish_and_clear();

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_result(&result, args.format, &config.output)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render a document result in the requested format.
pub fn format_result(
    result: &DocumentResult,
    format: OutputFormat,
    output: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => format_csv(result, &output.null_value),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(result)?)),
        OutputFormat::Text => Ok(format_text(result, &output.null_value)),
    }
}

fn format_csv(result: &DocumentResult, null_value: &str) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "Line Item",
        "Year",
        "Value",
        "Currency",
        "Units",
        "Confidence Flag",
    ])?;

    for fact in &result.facts {
        wtr.write_record([
            fact.line_item.name(),
            &fact.year.to_string(),
            &fact
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| null_value.to_string()),
            fact.currency.code(),
            fact.units.name(),
            fact.confidence.label(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &DocumentResult, null_value: &str) -> String {
    let mut output = String::new();

    let years: Vec<String> = result.years.years.iter().map(|y| y.to_string()).collect();
    output.push_str(&format!("Currency: {}\n", result.currency));
    output.push_str(&format!("Units:    {}\n", result.units));
    output.push_str(&format!(
        "Years:    {}{}\n",
        if years.is_empty() { "-".to_string() } else { years.join(", ") },
        if result.years.inferred { " (inferred)" } else { "" }
    ));
    output.push_str(&format!("Values:   {}\n", result.row_count));

    if result.is_empty() {
        output.push_str("\nNo income-statement line items found.\n");
        return output;
    }

    output.push('\n');
    for item in result.items() {
        output.push_str(&format!("{}\n", item));
        for fact in result.facts_for(item) {
            let value = fact
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| null_value.to_string());
            output.push_str(&format!(
                "  {:<10} {:>16}  {}\n",
                fact.year.to_string(),
                value,
                fact.confidence
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentResult {
        StatementParser::new().extract_from_text(
            "(USD in millions)\n2023 2022 2021\nRevenue 45,000 42,000 38,500\nNet income 9,800 8,700",
        )
    }

    #[test]
    fn test_csv_rows() {
        let csv = format_result(&sample(), OutputFormat::Csv, &OutputConfig::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Line Item,Year,Value,Currency,Units,Confidence Flag");
        assert_eq!(lines[1], "Revenue,2023,45000,USD,Millions,OK");
        assert_eq!(lines[6], "Net Income,2021,NULL,USD,Millions,Missing");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_csv_null_value() {
        let output = OutputConfig {
            null_value: String::new(),
        };
        let csv = format_result(&sample(), OutputFormat::Csv, &output).unwrap();
        assert!(csv.contains("Net Income,2021,,USD,Millions,Missing"));
    }

    #[test]
    fn test_text_summary() {
        let text = format_result(&sample(), OutputFormat::Text, &OutputConfig::default()).unwrap();
        assert!(text.contains("Currency: USD"));
        assert!(text.contains("Years:    2023, 2022, 2021\n"));
        assert!(text.contains("Values:   5"));
        assert!(text.contains("Net Income\n"));
    }

    #[test]
    fn test_text_empty_document() {
        let empty = DocumentResult::empty();
        let text = format_result(&empty, OutputFormat::Text, &OutputConfig::default()).unwrap();
        assert!(text.contains("Years:    -"));
        assert!(text.contains("No income-statement line items found."));
    }
}
