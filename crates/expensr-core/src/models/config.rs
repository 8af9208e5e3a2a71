//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the expensr pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpensrConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Structured extraction configuration.
    pub extraction: ExtractionConfig,

    /// Record store configuration.
    pub storage: StorageConfig,
}

impl Default for ExpensrConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            extraction: ExtractionConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract binary to invoke. A bare name is resolved via PATH.
    pub tesseract_binary: PathBuf,

    /// Recognition language passed to the engine.
    pub language: String,

    /// Maximum image dimension (longer side) after normalization.
    pub max_image_size: u32,

    /// Maximum accepted input size in bytes.
    pub max_file_bytes: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            max_image_size: 2048,
            max_file_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Language-model extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Model identifier sent with the completion request.
    pub model: String,

    /// Base URL of the completion API.
    pub base_url: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// OCR text beyond this length is truncated before prompting.
    pub max_ocr_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 60,
            max_ocr_chars: 8000,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("expenses.db"),
        }
    }
}

impl ExpensrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trip() {
        let config = ExpensrConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ExpensrConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ocr.max_image_size, 2048);
        assert_eq!(parsed.extraction.request_timeout_secs, 60);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: ExpensrConfig =
            serde_json::from_str(r#"{"ocr": {"language": "spa"}}"#).unwrap();
        assert_eq!(parsed.ocr.language, "spa");
        assert_eq!(parsed.ocr.max_image_size, 2048);
        assert_eq!(parsed.storage.db_path, PathBuf::from("expenses.db"));
    }
}
