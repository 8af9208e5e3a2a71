//! Error types for the expensr-core library.

use thiserror::Error;

/// Main error type for the expensr library.
#[derive(Error, Debug)]
pub enum ExpensrError {
    /// Image normalization error.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Structured extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// CSV export error.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to image normalization.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The image format is not in the supported set.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The bytes could not be decoded as the declared format.
    #[error("corrupt image: {0}")]
    Corrupt(String),

    /// The input exceeds the configured size limit.
    #[error("image too large: {bytes} bytes (limit {limit})")]
    TooLarge { bytes: u64, limit: u64 },
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR engine could not be invoked at all.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The OCR engine ran but failed to produce text.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors related to structured extraction.
///
/// A malformed model response is never an error; it degrades to the
/// fallback field scan. Only a failed service call surfaces here.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The language-model call could not be completed.
    #[error("extraction service error: {0}")]
    Service(String),
}

/// Errors related to the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying storage is unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// No record exists with the given id.
    #[error("record not found: {0}")]
    NotFound(i64),

    /// Rejected write: amounts must be non-negative.
    #[error("negative amount: {0}")]
    NegativeAmount(rust_decimal::Decimal),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to parse the PDF or extract its text.
    #[error("failed to extract text: {0}")]
    Parse(String),
}

/// Result type for the expensr library.
pub type Result<T> = std::result::Result<T, ExpensrError>;
