//! Process command - run the pipeline on a single receipt file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use expensr_core::normalize::ImageNormalizer;
use expensr_core::ocr::TesseractEngine;
use expensr_core::pipeline::ReceiptPipeline;
use expensr_core::ReceiptRecord;

use super::{build_extractor, load_config, open_store};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input receipt (image or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Skip the language-model call and use regex-only extraction
    #[arg(long)]
    offline: bool,

    /// Print the stored record as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
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
    spinner.set_message(format!("Processing {}", args.input.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = pipeline.process_path(&args.input).await;
    spinner.finish_and_clear();

    let record = result?;
    debug!("Processed in {:?}", start.elapsed());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    Ok(())
}

fn print_record(record: &ReceiptRecord) {
    println!(
        "{} Stored receipt {} from {}",
        style("✓").green(),
        style(record.id).bold(),
        record.source_filename
    );
    println!(
        "   venue:  {}",
        record.venue.as_deref().unwrap_or("(not found)")
    );
    println!(
        "   date:   {}",
        record
            .purchase_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "(not found)".to_string())
    );
    println!(
        "   amount: {}",
        record
            .total_amount
            .map(|a| format!("{:.2}", a))
            .unwrap_or_else(|| "(not found)".to_string())
    );
    println!(
        "   status: {} (use `expensr review {}` to confirm or correct)",
        record.review_status, record.id
    );
}
