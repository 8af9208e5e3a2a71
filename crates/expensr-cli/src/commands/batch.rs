//! Batch command - process every receipt in a directory.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use expensr_core::batch::process_directory;
use expensr_core::normalize::ImageNormalizer;
use expensr_core::ocr::TesseractEngine;
use expensr_core::pipeline::ReceiptPipeline;

use super::{build_extractor, load_config, open_store};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory of receipt files
    #[arg(required = true)]
    dir: PathBuf,

    /// Skip the language-model call and use regex-only extraction
    #[arg(long)]
    offline: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.dir.display());
    }

    let store = open_store(&config)?;
    let engine = TesseractEngine::from_config(&config.ocr);
    let extractor = build_extractor(&config, args.offline)?;
    let normalizer = ImageNormalizer::new()
        .with_max_size(config.ocr.max_image_size)
        .with_max_file_bytes(config.ocr.max_file_bytes);

    let pipeline = ReceiptPipeline::new(normalizer, Box::new(engine), extractor, &store);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Processing receipts in {}", args.dir.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = process_directory(&pipeline, &args.dir).await;
    spinner.finish_and_clear();

    let report = result?;

    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.succeeded() + report.failed(),
        start.elapsed()
    );
    println!(
        "   {} succeeded, {} failed",
        style(report.succeeded()).green(),
        style(report.failed()).red()
    );

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &report.failures {
            println!("  - {}: {}", failure.filename, failure.reason);
        }
    }

    Ok(())
}
