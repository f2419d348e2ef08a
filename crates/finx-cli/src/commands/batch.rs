//! Batch processing command for multiple statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use finx_core::models::config::FinxConfig;
use finx_core::DocumentResult;

use super::process::{format_result, OutputFormat};
use super::{extension_of, extract_file, load_config, SUPPORTED_EXTENSIONS};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    result: Option<DocumentResult>,
    error: Option<String>,
    processed_at: DateTime<Local>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = Arc::new(load_config(config_path)?);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| SUPPORTED_EXTENSIONS.contains(&extension_of(p).as_str()))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Files run on the blocking pool; results come back in input order
    let mut pending = stream::iter(files)
        .map(|path| {
            let config = Arc::clone(&config);
            let task_path = path.clone();
            let task = tokio::task::spawn_blocking(move || process_single_file(task_path, &config));
            async move { outcome_from_join(path, task.await) }
        })
        .buffered(args.jobs.max(1));

    let mut outcomes = Vec::new();
    while let Some(outcome) = pending.next().await {
        overall_pb.inc(1);

        if let Some(error_msg) = &outcome.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", outcome.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", outcome.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!(
                    "Processing failed for {}: {}",
                    outcome.path.display(),
                    error_msg
                );
            }
        }
        outcomes.push(outcome);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for outcome in &outcomes {
            if let Some(result) = &outcome.result {
                write_output(output_dir, &outcome.path, result, args.format, &config)?;
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcomes.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// A task that panicked counts as a failed file.
fn outcome_from_join(path: PathBuf, joined: Result<FileOutcome, JoinError>) -> FileOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            let reason = if e.is_panic() {
                "extraction panicked"
            } else {
                "extraction was cancelled"
            };
            FileOutcome {
                path,
                result: None,
                error: Some(reason.to_string()),
                processed_at: Local::now(),
            }
        }
    }
}

fn process_single_file(path: PathBuf, config: &FinxConfig) -> FileOutcome {
    let file_start = Instant::now();
    let extracted = extract_file(&path, config);
    debug!("Processed {} in {:?}", path.display(), file_start.elapsed());

    let (result, error) = match extracted {
        Ok(result) => (Some(result), None),
        Err(e) => (None, Some(e.to_string())),
    };

    FileOutcome {
        path,
        result,
        error,
        processed_at: Local::now(),
    }
}

fn write_output(
    output_dir: &Path,
    input: &Path,
    result: &DocumentResult,
    format: OutputFormat,
    config: &FinxConfig,
) -> anyhow::Result<()> {
    let output_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement");

    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));
    let content = format_result(result, format, &config.output)?;

    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "currency",
        "units",
        "years",
        "row_count",
        "processed_at",
        "error",
    ])?;

    for outcome in outcomes {
        let filename = outcome
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let processed_at = outcome.processed_at.to_rfc3339();

        if let Some(result) = &outcome.result {
            let years: Vec<String> = result.years.years.iter().map(|y| y.to_string()).collect();
            wtr.write_record([
                filename,
                "success",
                result.currency.code(),
                result.units.name(),
                &years.join(" "),
                &result.row_count.to_string(),
                &processed_at,
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &processed_at,
                outcome.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panicked_task_becomes_failed_outcome() {
        let joined = tokio::task::spawn_blocking(|| -> FileOutcome {
            panic!("malformed font program");
        })
        .await;

        let outcome = outcome_from_join(PathBuf::from("broken.pdf"), joined);
        assert_eq!(outcome.path, PathBuf::from("broken.pdf"));
        assert!(outcome.result.is_none());
        assert_eq!(outcome.error.as_deref(), Some("extraction panicked"));
    }

    #[tokio::test]
    async fn test_finished_task_passes_through() {
        let config = FinxConfig::default();
        let joined = tokio::task::spawn_blocking(move || {
            process_single_file(PathBuf::from("missing.txt"), &config)
        })
        .await;

        let outcome = outcome_from_join(PathBuf::from("ignored.txt"), joined);
        assert_eq!(outcome.path, PathBuf::from("missing.txt"));
        assert!(outcome.error.is_some());
    }
}
