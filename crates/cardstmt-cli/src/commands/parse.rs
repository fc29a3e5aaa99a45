//! Parse command - extract one statement.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use cardstmt_core::BatchOrchestrator;

use super::load_config;
use crate::output::{OutputFormat, format_record};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Password for an encrypted PDF
    #[arg(long)]
    password: Option<String>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.password.is_some() {
        config.pdf.password = args.password.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing statement: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Parsing {}", args.input.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let source = args.input.to_string_lossy().to_string();
    let outcome = tokio::task::spawn_blocking(move || {
        let registry = config.build_registry()?;
        let provider = config.pdf_provider();
        let outcome = BatchOrchestrator::new(&registry, &provider)
            .with_detection_pages(config.pdf.max_detection_pages)
            .process(&source);
        anyhow::Ok((outcome, config.extraction.currency))
    })
    .await??;
    let (outcome, currency) = outcome;

    pb.finish_and_clear();

    let Some(record) = outcome.record.as_ref() else {
        anyhow::bail!(
            "Failed to parse {}: {}",
            args.input.display(),
            outcome.failure_reason.as_deref().unwrap_or("unknown error")
        );
    };

    for warning in &outcome.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    let rendered = format_record(record, args.format, &currency)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    Ok(())
}
