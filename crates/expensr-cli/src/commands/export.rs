//! Export command - render stored receipts to CSV.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use console::style;

use expensr_core::export::export_csv;
use expensr_core::ReviewStatus;

use super::{load_config, open_store};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only export reviewed records
    #[arg(long)]
    reviewed_only: bool,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let mut records = store.list()?;
    if args.reviewed_only {
        records.retain(|r| r.review_status == ReviewStatus::Reviewed);
    }

    let bytes = export_csv(&records)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            println!(
                "{} Exported {} receipts to {}",
                style("✓").green(),
                records.len(),
                path.display()
            );
        }
        None => {
            std::io::stdout().write_all(&bytes)?;
        }
    }

    Ok(())
}
