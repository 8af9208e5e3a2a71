//! OCR over normalized receipt images.
//!
//! The engine shells out to the `tesseract` binary, the same runtime
//! dependency the rest of the receipt tooling ecosystem leans on. A
//! missing binary is a fatal, non-retriable condition for the current
//! invocation and surfaces as [`OcrError::EngineUnavailable`].

use std::path::PathBuf;
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Text recognition over a normalized image.
///
/// An empty result is not an error; receipts with no detectable text
/// simply yield an empty string.
pub trait OcrEngine: Send + Sync {
    /// Extract raw text from the image.
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// OCR engine invoking the external `tesseract` binary.
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl TesseractEngine {
    /// Create an engine using `tesseract` from PATH and English.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
        }
    }

    /// Create an engine from configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_binary.clone(),
            language: config.language.clone(),
        }
    }

    /// Check whether the engine can be invoked at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        // The binary reads from a file, so stage the normalized image in
        // a scratch PNG that is removed when the guard drops.
        let scratch = tempfile::Builder::new()
            .prefix("expensr-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Recognition(format!("scratch file: {}", e)))?;

        image
            .save_with_format(scratch.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("scratch write: {}", e)))?;

        debug!(
            "Running {} on {}",
            self.binary.display(),
            scratch.path().display()
        );

        let output = Command::new(&self.binary)
            .arg(scratch.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OcrError::EngineUnavailable(format!(
                        "{} not found; install Tesseract or set ocr.tesseract_binary",
                        self.binary.display()
                    ))
                } else {
                    OcrError::EngineUnavailable(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {}: {}", output.status, stderr.trim());
            return Err(OcrError::Recognition(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
