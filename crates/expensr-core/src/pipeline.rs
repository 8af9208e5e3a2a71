//! The single-receipt pipeline: image bytes to persisted record.

use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::extract::StructuredExtractor;
use crate::models::receipt::{NewReceipt, ReceiptRecord};
use crate::normalize::ImageNormalizer;
use crate::ocr::OcrEngine;
use crate::pdf;
use crate::store::ReceiptStore;

/// Receipt processing pipeline.
///
/// Normalizer, OCR, and extractor run in sequence; nothing touches the
/// store until extraction has succeeded, so a failed file never leaves
/// a partial record behind.
pub struct ReceiptPipeline<'a> {
    normalizer: ImageNormalizer,
    ocr: Box<dyn OcrEngine>,
    extractor: StructuredExtractor,
    store: &'a ReceiptStore,
}

impl<'a> ReceiptPipeline<'a> {
    pub fn new(
        normalizer: ImageNormalizer,
        ocr: Box<dyn OcrEngine>,
        extractor: StructuredExtractor,
        store: &'a ReceiptStore,
    ) -> Self {
        Self {
            normalizer,
            ocr,
            extractor,
            store,
        }
    }

    /// Process a receipt file on disk and persist the resulting record.
    pub async fn process_path(&self, path: &Path) -> Result<ReceiptRecord> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.process_bytes(&bytes, &filename).await
    }

    /// Process in-memory receipt bytes (e.g. an upload) and persist the
    /// resulting record.
    pub async fn process_bytes(&self, bytes: &[u8], filename: &str) -> Result<ReceiptRecord> {
        info!("Processing receipt: {}", filename);

        let raw_text = if has_extension(filename, "pdf") {
            pdf::extract_text(bytes)?
        } else {
            let image = self.normalizer.normalize(bytes)?;
            self.ocr.extract_text(&image)?
        };

        debug!("Recognized {} chars of text from {}", raw_text.len(), filename);

        let fields = self
            .extractor
            .extract(&raw_text, filename)
            .await?
            .into_fields();

        let record = self.store.insert(NewReceipt {
            source_filename: filename.to_string(),
            venue: fields.venue,
            purchase_date: fields.purchase_date,
            total_amount: fields.total_amount,
            raw_ocr_text: raw_text,
        })?;

        info!(
            "Stored receipt {} (venue: {}, amount: {})",
            record.id,
            record.venue.as_deref().unwrap_or("-"),
            record
                .total_amount
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );

        Ok(record)
    }
}

pub(crate) fn has_extension(filename: &str, ext: &str) -> bool {
    Path::new(filename)
        .extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ExpensrError, ImageError, OcrError};
    use crate::extract::StructuredExtractor;
    use crate::ocr::OcrEngine;
    use image::DynamicImage;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    pub(crate) struct FixedTextOcr(pub &'static str);

    impl OcrEngine for FixedTextOcr {
        fn extract_text(&self, _image: &DynamicImage) -> std::result::Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    pub(crate) fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            8,
            image::Rgb([255, 255, 255]),
        ));
        let mut buf = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn pipeline(store: &ReceiptStore) -> ReceiptPipeline<'_> {
        ReceiptPipeline::new(
            ImageNormalizer::new(),
            Box::new(FixedTextOcr("TOTAL $23.50 04/12/2024 Joe's Diner")),
            StructuredExtractor::fallback_only(),
            store,
        )
    }

    #[tokio::test]
    async fn test_process_bytes_persists_record() {
        let store = ReceiptStore::open_in_memory().unwrap();
        let record = pipeline(&store)
            .process_bytes(&png_bytes(), "dinner.png")
            .await
            .unwrap();

        assert_eq!(record.source_filename, "dinner.png");
        assert_eq!(
            record.total_amount,
            Some(Decimal::from_str("23.50").unwrap())
        );
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_image_stores_nothing() {
        let store = ReceiptStore::open_in_memory().unwrap();
        let bytes = png_bytes();

        let result = pipeline(&store).process_bytes(&bytes[..16], "bad.png").await;
        assert!(matches!(
            result,
            Err(ExpensrError::Image(ImageError::Corrupt(_)))
        ));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_ocr_text_still_persists() {
        let store = ReceiptStore::open_in_memory().unwrap();
        let pipeline = ReceiptPipeline::new(
            ImageNormalizer::new(),
            Box::new(FixedTextOcr("")),
            StructuredExtractor::fallback_only(),
            &store,
        );

        let record = pipeline
            .process_bytes(&png_bytes(), "blank.png")
            .await
            .unwrap();
        assert_eq!(record.venue, None);
        assert_eq!(record.total_amount, None);
        assert_eq!(record.raw_ocr_text, "");
    }

    #[tokio::test]
    async fn test_failed_service_call_stores_nothing() {
        let store = ReceiptStore::open_in_memory().unwrap();
        let config = crate::models::config::ExtractionConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let client = crate::extract::LlmClient::new(&config, "test-key".to_string()).unwrap();
        let pipeline = ReceiptPipeline::new(
            ImageNormalizer::new(),
            Box::new(FixedTextOcr("TOTAL $23.50")),
            StructuredExtractor::new(client),
            &store,
        );

        let result = pipeline.process_bytes(&png_bytes(), "dinner.png").await;
        assert!(matches!(result, Err(ExpensrError::Extract(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_has_extension_is_case_insensitive() {
        assert!(has_extension("scan.PDF", "pdf"));
        assert!(has_extension("scan.pdf", "pdf"));
        assert!(!has_extension("scan.png", "pdf"));
        assert!(!has_extension("pdf", "pdf"));
    }
}
