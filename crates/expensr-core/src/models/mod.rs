//! Data models for receipts and pipeline configuration.

pub mod config;
pub mod receipt;

pub use config::{ExpensrConfig, ExtractionConfig, OcrConfig, StorageConfig};
pub use receipt::{NewReceipt, ReceiptRecord, ReceiptUpdate, ReviewStatus};
