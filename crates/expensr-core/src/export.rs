//! Tabular export of receipt records.

use crate::error::{ExpensrError, Result};
use crate::models::receipt::ReceiptRecord;

/// Column order of the export. Fixed; review tooling downstream keys on
/// these positions.
pub const EXPORT_COLUMNS: [&str; 6] = [
    "venue",
    "purchase_date",
    "total_amount",
    "source_filename",
    "processed_at",
    "review_status",
];

/// Render records to CSV bytes in their given order.
///
/// Null fields become empty cells. An empty record set yields the
/// header row only.
pub fn export_csv(records: &[ReceiptRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;

    for record in records {
        writer.write_record([
            record.venue.clone().unwrap_or_default(),
            record
                .purchase_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            record
                .total_amount
                .map(|a| format!("{:.2}", a))
                .unwrap_or_default(),
            record.source_filename.clone(),
            record.processed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.review_status.to_string(),
        ])?;
    }

    writer.into_inner().map_err(|e| {
        ExpensrError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::ReviewStatus;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(id: i64, venue: Option<&str>) -> ReceiptRecord {
        ReceiptRecord {
            id,
            source_filename: format!("receipt-{}.jpg", id),
            venue: venue.map(|v| v.to_string()),
            purchase_date: NaiveDate::from_ymd_opt(2024, 4, 12),
            total_amount: Some(Decimal::from_str("23.5").unwrap()),
            raw_ocr_text: "TOTAL $23.50".to_string(),
            processed_at: NaiveDate::from_ymd_opt(2024, 4, 13)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            review_status: ReviewStatus::Unreviewed,
        }
    }

    #[test]
    fn test_empty_set_yields_header_only() {
        let bytes = export_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "venue,purchase_date,total_amount,source_filename,processed_at,review_status\n"
        );
    }

    #[test]
    fn test_null_venue_renders_empty_cell() {
        let bytes = export_csv(&[record(1, None)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let data_row = text.lines().nth(1).unwrap();
        assert!(data_row.starts_with(','));
        assert!(!data_row.contains("null"));
    }

    #[test]
    fn test_amount_rendered_with_two_decimals() {
        let bytes = export_csv(&[record(1, Some("Joe's Diner"))]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.lines().nth(1).unwrap(),
            "Joe's Diner,2024-04-12,23.50,receipt-1.jpg,2024-04-13 09:30:00,unreviewed"
        );
    }

    #[test]
    fn test_csv_failure_surfaces_as_export_error() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(EXPORT_COLUMNS).unwrap();
        let err = writer.write_record(["short", "row"]).unwrap_err();

        let wrapped: ExpensrError = err.into();
        assert!(matches!(wrapped, ExpensrError::Export(_)));
        assert!(wrapped.to_string().starts_with("export error:"));
    }

    #[test]
    fn test_input_order_preserved() {
        let records = vec![record(2, Some("B")), record(1, Some("A"))];
        let bytes = export_csv(&records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("B,"));
        assert!(lines[2].starts_with("A,"));
    }
}
