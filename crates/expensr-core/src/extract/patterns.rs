//! Common regex patterns for receipt field fallback extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Currency amounts: $1,234.56 / 1234.56 / $ 23.50
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"\$?\s*(\d{1,3}(?:,\d{3})*|\d+)\.(\d{2})\b"
    ).unwrap();

    // Labeled totals: "TOTAL $23.50", "Grand Total: 45.00", "Amount Due 12.00"
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(?:grand\s+total|total\s+due|amount\s+due|total|balance\s+due)\b[^\d\n]{0,12}\$?\s*(\d{1,3}(?:,\d{3})*|\d+)\.(\d{2})\b"
    ).unwrap();

    // US-style dates: 04/12/2024, 4-12-24
    pub static ref DATE_MDY: Regex = Regex::new(
        r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{4}|\d{2})\b"
    ).unwrap();

    // ISO dates: 2024-04-12
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})\b"
    ).unwrap();

    // Month-name dates: "Apr 12, 2024" / "April 12 2024"
    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})"
    ).unwrap();

    // Lines that are clearly not a venue name
    pub static ref NON_VENUE_LINE: Regex = Regex::new(
        r"(?i)\b(total|subtotal|tax|tip|cash|change|card|visa|mastercard|receipt|invoice|thank|server|table|order)\b"
    ).unwrap();
}
