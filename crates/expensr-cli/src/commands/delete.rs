//! Delete command - remove a receipt record.

use clap::Args;
use console::style;

use super::{load_config, open_store};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Record id to delete
    #[arg(required = true)]
    id: i64,
}

pub async fn run(args: DeleteArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    store.delete(args.id)?;
    println!("{} Deleted receipt {}", style("✓").green(), args.id);

    Ok(())
}
