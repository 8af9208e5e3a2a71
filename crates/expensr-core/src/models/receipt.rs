//! Receipt record data models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted receipt record, the central entity of the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Unique identifier, assigned at insert, immutable.
    pub id: i64,

    /// Original image reference. Not unique; the same image may be
    /// reprocessed into multiple records.
    pub source_filename: String,

    /// Extracted or user-corrected merchant name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    /// Extracted purchase date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,

    /// Extracted total including tip, two decimal places, non-negative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    /// Full OCR output, retained for audit and re-extraction.
    pub raw_ocr_text: String,

    /// Pipeline completion timestamp, immutable once set.
    pub processed_at: NaiveDateTime,

    /// Human review state.
    pub review_status: ReviewStatus,
}

/// Whether a human has confirmed or corrected the extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Fresh from the pipeline, not yet looked at.
    Unreviewed,
    /// Confirmed or corrected by an explicit user action.
    Reviewed,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Unreviewed => "unreviewed",
            ReviewStatus::Reviewed => "reviewed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unreviewed" => Some(ReviewStatus::Unreviewed),
            "reviewed" => Some(ReviewStatus::Reviewed),
            _ => None,
        }
    }
}

impl Default for ReviewStatus {
    fn default() -> Self {
        ReviewStatus::Unreviewed
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate record produced by the pipeline, before the store assigns
/// `id`, `processed_at`, and the initial review status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReceipt {
    pub source_filename: String,
    pub venue: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
    pub raw_ocr_text: String,
}

/// Partial update of the mutable receipt fields.
///
/// `None` leaves a field unchanged. `id`, `source_filename`,
/// `raw_ocr_text`, and `processed_at` are never touched by an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptUpdate {
    pub venue: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
    pub review_status: Option<ReviewStatus>,
}

impl ReceiptUpdate {
    /// True when the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.venue.is_none()
            && self.purchase_date.is_none()
            && self.total_amount.is_none()
            && self.review_status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_review_status_round_trip() {
        for status in [ReviewStatus::Unreviewed, ReviewStatus::Reviewed] {
            assert_eq!(ReviewStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReviewStatus::parse("pending"), None);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ReceiptUpdate::default().is_empty());

        let update = ReceiptUpdate {
            venue: Some("Joe's Diner".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
