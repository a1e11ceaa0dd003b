//! Batch processing command for multiple bill files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use fatura_core::bill::BillParser;
use fatura_core::models::bill::BillRecord;
use fatura_core::models::config::FaturaConfig;

use super::config::load_config;
use super::process::{
    format_record, load_text, shared_parser, summary_header, summary_row, OutputFormat,
};

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
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of documents processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<BillRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = Arc::new(load_config(config_path)?);

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();

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

    let parser = shared_parser(&config)?;
    let jobs = args.jobs.max(1);
    debug!("Processing {} files with {} concurrent jobs", files.len(), jobs);

    let mut pending = stream::iter(files)
        .map(|path| {
            let parser = Arc::clone(&parser);
            let config = Arc::clone(&config);
            async move {
                let file_start = Instant::now();
                let result = process_single_file(&path, &parser, &config).await;
                (path, result, file_start.elapsed().as_millis() as u64)
            }
        })
        .buffer_unordered(jobs);

    let mut results = Vec::new();
    while let Some((path, result, processing_time_ms)) = pending.next().await {
        overall_pb.inc(1);

        match result {
            Ok(record) => results.push(ProcessResult {
                path,
                record: Some(record),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = format!("{:#}", e);
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }
    }

    overall_pb.finish_with_message("Complete");

    // Completion order is arbitrary; report in path order
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            let Some(record) = &result.record else {
                continue;
            };
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("bill");
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_record(record, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "pdf" | "txt" | "text")
}

async fn process_single_file(
    path: &Path,
    parser: &BillParser,
    config: &Arc<FaturaConfig>,
) -> anyhow::Result<BillRecord> {
    // PDF text extraction is CPU-bound; keep it off the async workers
    let owned_path = path.to_path_buf();
    let config = Arc::clone(config);
    let (text, source_type) =
        tokio::task::spawn_blocking(move || load_text(&owned_path, &config)).await??;

    let result = parser.parse_with_source(&text, source_type).await?;
    Ok(result.record)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(summary_header())?;

    for result in results {
        wtr.write_record(summary_row(
            &result.path,
            result.record.as_ref(),
            result.error.as_deref(),
            result.processing_time_ms,
        ))?;
    }

    wtr.flush()?;
    Ok(())
}
