//! Review command - correct fields and confirm a receipt.

use chrono::NaiveDate;
use clap::Args;
use console::style;
use rust_decimal::Decimal;

use expensr_core::{ReceiptUpdate, ReviewStatus};

use super::{load_config, open_store};

/// Arguments for the review command.
#[derive(Args)]
pub struct ReviewArgs {
    /// Record id to review
    #[arg(required = true)]
    id: i64,

    /// Corrected venue name
    #[arg(long)]
    venue: Option<String>,

    /// Corrected purchase date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Corrected total amount
    #[arg(long)]
    amount: Option<Decimal>,

    /// Leave the record unreviewed (edit without confirming)
    #[arg(long)]
    keep_unreviewed: bool,
}

pub async fn run(args: ReviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    if let Some(amount) = args.amount {
        if amount.is_sign_negative() {
            anyhow::bail!("Amount must be non-negative: {}", amount);
        }
    }

    let update = ReceiptUpdate {
        venue: args.venue,
        purchase_date: args.date,
        total_amount: args.amount,
        review_status: if args.keep_unreviewed {
            None
        } else {
            Some(ReviewStatus::Reviewed)
        },
    };

    let record = store.update(args.id, update)?;

    println!(
        "{} Receipt {} is now {}",
        style("✓").green(),
        record.id,
        record.review_status
    );
    println!(
        "   {} | {} | {}",
        record.venue.as_deref().unwrap_or("-"),
        record
            .purchase_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
        record
            .total_amount
            .map(|a| format!("{:.2}", a))
            .unwrap_or_else(|| "-".to_string()),
    );

    Ok(())
}
