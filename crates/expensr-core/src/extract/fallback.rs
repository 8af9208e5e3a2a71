//! Best-effort field scraping from raw OCR text.
//!
//! Used when the language-model response is malformed or when no model
//! is configured at all. Fields that cannot be recovered stay `None`;
//! this path never produces an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::ExtractedFields;
use super::patterns::{
    AMOUNT_PATTERN, DATE_MDY, DATE_MONTH_NAME, DATE_YMD, NON_VENUE_LINE, TOTAL_LABEL,
};

/// Scrape whatever fields can be recovered from the OCR text.
pub fn scrape_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        venue: scrape_venue(text),
        purchase_date: scrape_date(text),
        total_amount: scrape_amount(text),
    }
}

/// Find the total amount.
///
/// A labeled total wins; otherwise the largest currency-looking amount
/// on the receipt is taken, since totals sit at the bottom and dominate
/// line items.
pub fn scrape_amount(text: &str) -> Option<Decimal> {
    if let Some(caps) = TOTAL_LABEL.captures(text) {
        if let Some(amount) = assemble_amount(&caps[1], &caps[2]) {
            return Some(amount);
        }
    }

    AMOUNT_PATTERN
        .captures_iter(text)
        .filter_map(|caps| assemble_amount(&caps[1], &caps[2]))
        .max()
}

/// Find a purchase date, trying US numeric, ISO, and month-name forms.
pub fn scrape_date(text: &str) -> Option<NaiveDate> {
    for caps in DATE_YMD.captures_iter(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    for caps in DATE_MDY.captures_iter(text) {
        let first: u32 = caps[1].parse().unwrap_or(0);
        let second: u32 = caps[2].parse().unwrap_or(0);
        let year = parse_year(&caps[3]);

        // US month/day order, falling back to day/month when invalid.
        if let Some(date) = NaiveDate::from_ymd_opt(year, first, second) {
            return Some(date);
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year, second, first) {
            return Some(date);
        }
    }

    for caps in DATE_MONTH_NAME.captures_iter(text) {
        let month = month_abbrev_to_number(&caps[1]);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

/// Guess the venue from the top of the receipt.
///
/// Receipts print the merchant name first, so take the first line that
/// reads like a name rather than an amount, a date, or a totals label.
pub fn scrape_venue(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(5)
        .find(|line| {
            line.chars().filter(|c| c.is_alphabetic()).count() >= 3
                && !NON_VENUE_LINE.is_match(line)
                && !AMOUNT_PATTERN.is_match(line)
                && !DATE_MDY.is_match(line)
                && !DATE_YMD.is_match(line)
        })
        .map(|line| line.to_string())
}

/// Parse an amount string like "1,234.56" or "$ 23.50" to a
/// non-negative two-decimal value.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let amount = Decimal::from_str(&cleaned).ok()?;
    if amount.is_sign_negative() {
        return None;
    }
    Some(amount.round_dp(2))
}

fn assemble_amount(integer_part: &str, decimal_part: &str) -> Option<Decimal> {
    let digits = integer_part.replace(',', "");
    parse_amount(&format!("{}.{}", digits, decimal_part))
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn month_abbrev_to_number(abbrev: &str) -> u32 {
    match abbrev.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scrape_labeled_total() {
        let text = "Burger 8.00\nFries 3.50\nTOTAL $23.50";
        assert_eq!(scrape_amount(text), Some(Decimal::from_str("23.50").unwrap()));
    }

    #[test]
    fn test_scrape_largest_amount_without_label() {
        let text = "Item 4.25\nItem 19.99\nItem 2.50";
        assert_eq!(scrape_amount(text), Some(Decimal::from_str("19.99").unwrap()));
    }

    #[test]
    fn test_scrape_date_mdy() {
        assert_eq!(
            scrape_date("04/12/2024"),
            NaiveDate::from_ymd_opt(2024, 4, 12)
        );
    }

    #[test]
    fn test_scrape_date_dmy_when_mdy_invalid() {
        // 25 cannot be a month, so day/month order applies.
        assert_eq!(
            scrape_date("25/04/2024"),
            NaiveDate::from_ymd_opt(2024, 4, 25)
        );
    }

    #[test]
    fn test_scrape_date_iso() {
        assert_eq!(
            scrape_date("printed 2024-04-12 10:31"),
            NaiveDate::from_ymd_opt(2024, 4, 12)
        );
    }

    #[test]
    fn test_scrape_date_month_name() {
        assert_eq!(
            scrape_date("April 12, 2024"),
            NaiveDate::from_ymd_opt(2024, 4, 12)
        );
    }

    #[test]
    fn test_scrape_date_two_digit_year() {
        assert_eq!(
            scrape_date("4/12/24"),
            NaiveDate::from_ymd_opt(2024, 4, 12)
        );
    }

    #[test]
    fn test_scrape_venue_first_plausible_line() {
        let text = "Joe's Diner\n123 Main St\n04/12/2024\nTOTAL $23.50";
        assert_eq!(scrape_venue(text), Some("Joe's Diner".to_string()));
    }

    #[test]
    fn test_scrape_venue_skips_totals_lines() {
        let text = "TOTAL $23.50 04/12/2024 Joe's Diner";
        assert_eq!(scrape_venue(text), None);
    }

    #[test]
    fn test_scenario_total_date_venue_line() {
        let fields = scrape_fields("TOTAL $23.50 04/12/2024 Joe's Diner");
        assert_eq!(
            fields.total_amount,
            Some(Decimal::from_str("23.50").unwrap())
        );
        assert_eq!(fields.purchase_date, NaiveDate::from_ymd_opt(2024, 4, 12));
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert_eq!(parse_amount("-12.00"), None);
    }

    #[test]
    fn test_parse_amount_rounds_to_two_decimals() {
        assert_eq!(
            parse_amount("12.348"),
            Some(Decimal::from_str("12.35").unwrap())
        );
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let fields = scrape_fields("");
        assert_eq!(fields.venue, None);
        assert_eq!(fields.purchase_date, None);
        assert_eq!(fields.total_amount, None);
    }
}
