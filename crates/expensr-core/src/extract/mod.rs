//! Structured extraction: OCR text to typed receipt fields.
//!
//! The extractor sends the OCR text to a hosted language model with a
//! fixed prompt and parses the reply strictly. A malformed reply is not
//! an error; it degrades to a regex scan of the raw text. Only a failed
//! service call surfaces as [`ExtractError::Service`].

mod client;
pub mod fallback;
pub mod patterns;

pub use client::LlmClient;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ExtractError;

/// The optional-field record shape both parse paths converge on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub venue: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
}

/// How the fields were obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The model reply parsed against the strict schema.
    Parsed(ExtractedFields),
    /// The reply was malformed (or no model is configured); fields came
    /// from the fallback scan of the OCR text.
    Fallback(ExtractedFields),
}

impl ExtractionOutcome {
    /// The extracted fields regardless of how they were obtained.
    pub fn fields(&self) -> &ExtractedFields {
        match self {
            ExtractionOutcome::Parsed(fields) | ExtractionOutcome::Fallback(fields) => fields,
        }
    }

    pub fn into_fields(self) -> ExtractedFields {
        match self {
            ExtractionOutcome::Parsed(fields) | ExtractionOutcome::Fallback(fields) => fields,
        }
    }
}

/// Strict schema the model is instructed to reply with.
#[derive(Debug, Deserialize)]
struct LlmReceiptFields {
    #[serde(alias = "restaurant_name", alias = "merchant")]
    venue: Option<String>,
    #[serde(alias = "purchase_date")]
    date: Option<String>,
    #[serde(alias = "amount", alias = "total")]
    total_amount: Option<serde_json::Value>,
}

/// Turns raw OCR text into typed receipt fields.
pub struct StructuredExtractor {
    client: Option<LlmClient>,
    max_ocr_chars: usize,
}

impl StructuredExtractor {
    /// Extractor backed by a language-model client.
    pub fn new(client: LlmClient) -> Self {
        Self {
            client: Some(client),
            max_ocr_chars: 8000,
        }
    }

    /// Extractor that skips the model call and only runs the fallback
    /// scan. Used when no API key is configured.
    pub fn fallback_only() -> Self {
        Self {
            client: None,
            max_ocr_chars: 8000,
        }
    }

    /// Cap on how much OCR text is sent to the model.
    pub fn with_max_ocr_chars(mut self, chars: usize) -> Self {
        self.max_ocr_chars = chars;
        self
    }

    /// Extract fields from OCR text.
    ///
    /// `source_filename` is only used for log context. Errors only when
    /// the model call itself cannot be completed; in that case the
    /// caller must not persist anything.
    pub async fn extract(
        &self,
        ocr_text: &str,
        source_filename: &str,
    ) -> Result<ExtractionOutcome, ExtractError> {
        let client = match &self.client {
            Some(client) => client,
            None => {
                debug!("No model configured, scraping {}", source_filename);
                return Ok(ExtractionOutcome::Fallback(fallback::scrape_fields(
                    ocr_text,
                )));
            }
        };

        let excerpt = truncate_chars(ocr_text, self.max_ocr_chars);
        let reply = client.complete(&extraction_prompt(excerpt)).await?;

        match parse_reply(&reply) {
            Some(fields) => Ok(ExtractionOutcome::Parsed(fields)),
            None => {
                warn!(
                    "Malformed model reply for {}, falling back to field scan",
                    source_filename
                );
                Ok(ExtractionOutcome::Fallback(fallback::scrape_fields(
                    ocr_text,
                )))
            }
        }
    }
}

/// The fixed extraction prompt.
fn extraction_prompt(ocr_text: &str) -> String {
    format!(
        "You extract structured information from receipts.\n\
         \n\
         Extract data from this receipt:\n\
         \n\
         ---\n\
         {}\n\
         ---\n\
         \n\
         Reply with a JSON object with exactly these keys:\n\
         - \"venue\": the restaurant or merchant name\n\
         - \"date\": the purchase date, format YYYY-MM-DD\n\
         - \"total_amount\": the total paid including tip, number only, no currency symbol\n\
         \n\
         Use null for any value that is not present in the receipt. Reply with the JSON object only.",
        ocr_text
    )
}

/// Strict parse of the model reply into fields.
///
/// Tolerates a markdown code fence around the JSON, since models wrap
/// replies that way even when told not to. Anything else malformed
/// returns `None` and the caller falls back.
fn parse_reply(reply: &str) -> Option<ExtractedFields> {
    let json = strip_code_fence(reply);
    let raw: LlmReceiptFields = serde_json::from_str(json.trim()).ok()?;

    let venue = raw
        .venue
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let purchase_date = raw.date.as_deref().and_then(parse_reply_date);

    let total_amount = raw.total_amount.as_ref().and_then(parse_reply_amount);

    Some(ExtractedFields {
        venue,
        purchase_date,
        total_amount,
    })
}

fn parse_reply_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| fallback::scrape_date(s))
}

fn parse_reply_amount(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => fallback::parse_amount(&n.to_string()),
        serde_json::Value::String(s) => fallback::parse_amount(s),
        _ => None,
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    if let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        if let Some(end) = rest.rfind("```") {
            return &rest[..end];
        }
    }
    trimmed
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_parse_well_formed_reply() {
        let fields = parse_reply(
            r#"{"venue": "Joe's Diner", "date": "2024-04-12", "total_amount": 23.5}"#,
        )
        .unwrap();

        assert_eq!(fields.venue, Some("Joe's Diner".to_string()));
        assert_eq!(fields.purchase_date, NaiveDate::from_ymd_opt(2024, 4, 12));
        assert_eq!(
            fields.total_amount,
            Some(Decimal::from_str("23.50").unwrap())
        );
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"venue\": \"Cafe Luna\", \"date\": null, \"total_amount\": \"12.00\"}\n```";
        let fields = parse_reply(reply).unwrap();

        assert_eq!(fields.venue, Some("Cafe Luna".to_string()));
        assert_eq!(fields.purchase_date, None);
        assert_eq!(
            fields.total_amount,
            Some(Decimal::from_str("12.00").unwrap())
        );
    }

    #[test]
    fn test_parse_reply_with_original_key_names() {
        let fields = parse_reply(
            r#"{"restaurant_name": "Joe's", "date": "2024-01-05", "total_amount": 8}"#,
        )
        .unwrap();
        assert_eq!(fields.venue, Some("Joe's".to_string()));
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert_eq!(parse_reply("I could not find any receipt data."), None);
    }

    #[test]
    fn test_parse_negative_amount_dropped() {
        let fields =
            parse_reply(r#"{"venue": null, "date": null, "total_amount": -5.0}"#).unwrap();
        assert_eq!(fields.total_amount, None);
    }

    #[test]
    fn test_all_null_reply_is_valid() {
        let fields =
            parse_reply(r#"{"venue": null, "date": null, "total_amount": null}"#).unwrap();
        assert_eq!(fields, ExtractedFields::default());
    }

    #[tokio::test]
    async fn test_fallback_only_extractor_never_errors() {
        let extractor = StructuredExtractor::fallback_only();
        let outcome = extractor
            .extract("TOTAL $23.50 04/12/2024 Joe's Diner", "receipt.jpg")
            .await
            .unwrap();

        assert!(matches!(outcome, ExtractionOutcome::Fallback(_)));
        assert_eq!(
            outcome.fields().total_amount,
            Some(Decimal::from_str("23.50").unwrap())
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_propagates_without_fallback() {
        let config = crate::models::config::ExtractionConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let client = LlmClient::new(&config, "test-key".to_string()).unwrap();
        let extractor = StructuredExtractor::new(client);

        let result = extractor.extract("TOTAL $23.50", "receipt.jpg").await;
        assert!(matches!(result, Err(ExtractError::Service(_))));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("łómża receipt", 4), "łómż");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
