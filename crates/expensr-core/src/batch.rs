//! Batch processing over a directory of receipt files.

use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::receipt::ReceiptRecord;
use crate::pipeline::ReceiptPipeline;

/// File extensions the batch driver picks up, matched
/// case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "gif", "pdf"];

/// One file that failed, with the reason it failed.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub filename: String,
    pub reason: String,
}

/// Aggregated outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records persisted, one per succeeded file.
    pub records: Vec<ReceiptRecord>,
    /// Per-file failures; a failed file never persists anything.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Process every supported file in `dir` through the pipeline.
///
/// Files are visited in filename order so runs are deterministic. One
/// file's failure never aborts the batch; it lands in the report with
/// its reason. Errors only if the directory itself cannot be read.
pub async fn process_directory(pipeline: &ReceiptPipeline<'_>, dir: &Path) -> Result<BatchReport> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    paths.sort();

    info!("Batch processing {} files in {}", paths.len(), dir.display());

    let mut report = BatchReport::default();
    for path in paths {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match pipeline.process_path(&path).await {
            Ok(record) => report.records.push(record),
            Err(e) => {
                warn!("Failed to process {}: {}", filename, e);
                report.failures.push(BatchFailure {
                    filename,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Batch complete: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );

    Ok(report)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::StructuredExtractor;
    use crate::normalize::ImageNormalizer;
    use crate::pipeline::tests::{png_bytes, FixedTextOcr};
    use crate::store::ReceiptStore;
    use pretty_assertions::assert_eq;

    fn pipeline(store: &ReceiptStore) -> ReceiptPipeline<'_> {
        ReceiptPipeline::new(
            ImageNormalizer::new(),
            Box::new(FixedTextOcr("TOTAL $23.50 04/12/2024")),
            StructuredExtractor::fallback_only(),
            store,
        )
    }

    #[tokio::test]
    async fn test_one_corrupt_among_valid_files() {
        let dir = tempfile::tempdir().unwrap();
        let valid = png_bytes();
        std::fs::write(dir.path().join("a.png"), &valid).unwrap();
        std::fs::write(dir.path().join("b.jpg"), {
            let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
                8,
                8,
                image::Rgb([0, 0, 0]),
            ));
            let mut buf = Vec::new();
            image
                .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Jpeg)
                .unwrap();
            buf
        })
        .unwrap();
        std::fs::write(dir.path().join("c.png"), &valid[..16]).unwrap();
        // Unsupported extensions are skipped, not failed.
        std::fs::write(dir.path().join("notes.txt"), b"not a receipt").unwrap();

        let store = ReceiptStore::open_in_memory().unwrap();
        let report = process_directory(&pipeline(&store), dir.path())
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].filename, "c.png");
        assert!(report.failures[0].reason.contains("corrupt"));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_extensions_matched_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("UPPER.PNG"), png_bytes()).unwrap();

        let store = ReceiptStore::open_in_memory().unwrap();
        let report = process_directory(&pipeline(&store), dir.path())
            .await
            .unwrap();
        assert_eq!(report.succeeded(), 1);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReceiptStore::open_in_memory().unwrap();
        let report = process_directory(&pipeline(&store), dir.path())
            .await
            .unwrap();
        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed(), 0);
    }

    #[tokio::test]
    async fn test_missing_directory_errors() {
        let store = ReceiptStore::open_in_memory().unwrap();
        let result =
            process_directory(&pipeline(&store), Path::new("/no/such/directory")).await;
        assert!(result.is_err());
    }
}
