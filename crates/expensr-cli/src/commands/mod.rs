//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod delete;
pub mod export;
pub mod list;
pub mod process;
pub mod review;

use std::path::PathBuf;

use expensr_core::extract::{LlmClient, StructuredExtractor};
use expensr_core::models::config::ExpensrConfig;
use expensr_core::store::ReceiptStore;

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("expensr")
        .join("config.json")
}

/// Load configuration: explicit path, then the default location, then
/// built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ExpensrConfig> {
    if let Some(path) = config_path {
        return Ok(ExpensrConfig::from_file(std::path::Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        return Ok(ExpensrConfig::from_file(&default_path)?);
    }

    Ok(ExpensrConfig::default())
}

/// Open the record store configured in `storage.db_path`.
pub fn open_store(config: &ExpensrConfig) -> anyhow::Result<ReceiptStore> {
    Ok(ReceiptStore::open(&config.storage.db_path)?)
}

/// Build the structured extractor: language model when a key is
/// present, fallback-only when `--offline` was requested.
pub fn build_extractor(
    config: &ExpensrConfig,
    offline: bool,
) -> anyhow::Result<StructuredExtractor> {
    if offline {
        return Ok(
            StructuredExtractor::fallback_only().with_max_ocr_chars(config.extraction.max_ocr_chars)
        );
    }

    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => {
            let client = LlmClient::new(&config.extraction, key)?;
            Ok(StructuredExtractor::new(client)
                .with_max_ocr_chars(config.extraction.max_ocr_chars))
        }
        _ => anyhow::bail!(
            "{} is not set; export an API key or pass --offline to use regex-only extraction",
            API_KEY_ENV
        ),
    }
}
