//! List command - show stored receipts, most recent first.

use clap::Args;
use console::style;

use expensr_core::ReviewStatus;

use super::{load_config, open_store};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Only show records awaiting review
    #[arg(long)]
    unreviewed: bool,

    /// Print records as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let mut records = store.list()?;
    if args.unreviewed {
        records.retain(|r| r.review_status == ReviewStatus::Unreviewed);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No receipts stored.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<24} {:<12} {:>10}  {:<10}  {}",
        style("id").bold(),
        style("venue").bold(),
        style("date").bold(),
        style("amount").bold(),
        style("status").bold(),
        style("file").bold(),
    );

    for record in &records {
        let status = match record.review_status {
            ReviewStatus::Reviewed => style("reviewed").green(),
            ReviewStatus::Unreviewed => style("unreviewed").yellow(),
        };

        println!(
            "{:>5}  {:<24} {:<12} {:>10}  {:<10}  {}",
            record.id,
            record.venue.as_deref().unwrap_or("-"),
            record
                .purchase_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            record
                .total_amount
                .map(|a| format!("{:.2}", a))
                .unwrap_or_else(|| "-".to_string()),
            status,
            record.source_filename,
        );
    }

    println!();
    println!("{} receipts", records.len());

    Ok(())
}
