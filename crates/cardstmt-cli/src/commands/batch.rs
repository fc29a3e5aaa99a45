//! Batch command - many statements, one CSV each, plus a processing report.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use cardstmt_core::{BatchOrchestrator, BatchReport};

use super::load_config;
use crate::output::{OutputFormat, claim_file_name, format_record, output_file_name};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for statement PDFs (e.g. "statements/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory (default: from config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each statement
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of parallel workers (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Password for encrypted PDFs
    #[arg(long)]
    password: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.password.is_some() {
        config.pdf.password = args.password.clone();
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} statements to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output.output_dir.clone());
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} statements")?
            .progress_chars("=>-"),
    );

    let sources: Vec<String> = files.iter().map(|p| p.to_string_lossy().to_string()).collect();
    let jobs = args.jobs.unwrap_or(config.batch.jobs);
    let currency = config.extraction.currency.clone();

    let progress = pb.clone();
    let mut report = tokio::task::spawn_blocking(move || {
        let registry = config.build_registry()?;
        let provider = config.pdf_provider();
        let report = BatchOrchestrator::new(&registry, &provider)
            .with_jobs(jobs)
            .with_detection_pages(config.pdf.max_detection_pages)
            .run_with_progress(&sources, |_| progress.inc(1));
        anyhow::Ok(report)
    })
    .await??;

    pb.finish_with_message("Complete");

    write_outputs(&mut report, &output_dir, args.format, &currency)?;

    let report_path = output_dir.join(report.file_name());
    fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;

    print_summary(&report, &report_path, &currency, start);

    Ok(())
}

/// Write one file per successful statement and record where it went.
///
/// Inputs sharing a file stem get numbered names instead of overwriting
/// each other. A failed write stays a successful parse but is listed in
/// the document's warnings.
fn write_outputs(
    report: &mut BatchReport,
    output_dir: &Path,
    format: OutputFormat,
    currency: &str,
) -> anyhow::Result<()> {
    let mut claimed = HashSet::new();

    for detail in report.details.iter_mut() {
        let Some(record) = &detail.record else {
            continue;
        };

        let name = output_file_name(Path::new(&detail.source_reference), record.bank_name(), format);
        let output_path = output_dir.join(claim_file_name(&mut claimed, name));
        let content = format_record(record, format, currency)?;

        match fs::write(&output_path, content) {
            Ok(()) => {
                debug!("Wrote output to {}", output_path.display());
                detail.output_file = Some(output_path);
            }
            Err(e) => {
                warn!("Failed to write {}: {}", output_path.display(), e);
                detail
                    .warnings
                    .push(format!("Failed to write {}: {}", output_path.display(), e));
            }
        }
    }
    Ok(())
}

fn print_summary(report: &BatchReport, report_path: &Path, currency: &str, start: Instant) {
    let total_due: Decimal = report.records().map(|r| r.total_amount_due()).sum();
    let transactions: usize = report.records().map(|r| r.transactions().len()).sum();

    println!();
    println!(
        "{} Processed {} statements in {:?}",
        style("✓").green(),
        report.total_processed,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(report.successful).green(),
        style(report.failed).red()
    );
    if report.successful > 0 {
        println!(
            "   {} transactions, {} {} total due",
            transactions, currency, total_due
        );
    }
    println!(
        "{} Report written to {}",
        style("ℹ").blue(),
        report_path.display()
    );

    let failed: Vec<_> = report.failures().collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for detail in failed {
            println!(
                "  - {}: {}",
                detail.source_reference,
                detail.failure_reason.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
