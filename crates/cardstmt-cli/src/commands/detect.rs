//! Detect command - report which bank issued a statement.

use std::path::PathBuf;

use clap::Args;

use cardstmt_core::{BankDetector, Detection, PageTextProvider};

use super::load_config;

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Password for an encrypted PDF
    #[arg(long)]
    password: Option<String>,
}

pub async fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.password.is_some() {
        config.pdf.password = args.password.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let registry = config.build_registry()?;
    let pages = config
        .pdf_provider()
        .page_texts(&args.input.to_string_lossy())?;

    let detector = BankDetector::new(&registry).with_max_pages(config.pdf.max_detection_pages);
    match detector.detect(&pages) {
        Detection::Matched(profile) => println!("{}", profile.name()),
        Detection::Unknown => println!("unknown"),
    }

    Ok(())
}
