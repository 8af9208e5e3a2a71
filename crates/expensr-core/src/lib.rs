//! Core library for receipt expense extraction.
//!
//! This crate provides:
//! - Image normalization for OCR input
//! - OCR via the external Tesseract engine
//! - Structured extraction (language-model call with regex fallback)
//! - SQLite record store with review metadata
//! - CSV export and directory batch processing

pub mod batch;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod store;

pub use batch::{process_directory, BatchFailure, BatchReport, SUPPORTED_EXTENSIONS};
pub use error::{ExpensrError, ExtractError, ImageError, OcrError, PdfError, Result, StoreError};
pub use export::export_csv;
pub use extract::{ExtractedFields, ExtractionOutcome, LlmClient, StructuredExtractor};
pub use models::config::ExpensrConfig;
pub use models::receipt::{NewReceipt, ReceiptRecord, ReceiptUpdate, ReviewStatus};
pub use normalize::ImageNormalizer;
pub use ocr::{OcrEngine, TesseractEngine};
pub use pipeline::ReceiptPipeline;
pub use store::ReceiptStore;
