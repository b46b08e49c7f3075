//! Document numbering for quotes (`DEV-###`) and invoices (`FAC-###`).
//!
//! The floor for a new number is the suffix of the most recently created
//! document of the same kind plus one. Nothing is reserved: two documents
//! created concurrently can still pick the same number.

use crate::services::store::RevenueStore;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Length of every document prefix (`DEV-`, `FAC-`).
const PREFIX_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quote,
    Invoice,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Quote => "DEV-",
            Self::Invoice => "FAC-",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Invoice => "invoice",
        }
    }

    /// Prefix followed by the value padded to three digits.
    pub fn format_number(&self, value: u64) -> String {
        format!("{}{:03}", self.prefix(), value)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rejections for a manually entered document number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberingError {
    #[error("'{input}' is not a valid document number")]
    InvalidFormat { input: String },

    #[error("document number must be at least {minimum}")]
    BelowMinimum { minimum: String },
}

impl NumberingError {
    /// Message key handed to the client for translation.
    pub fn key(&self) -> &'static str {
        match self {
            Self::InvalidFormat { .. } => "numbering.invalid_format",
            Self::BelowMinimum { .. } => "numbering.below_minimum",
        }
    }
}

impl From<NumberingError> for AppError {
    fn from(err: NumberingError) -> Self {
        AppError::InvalidInput {
            key: err.key(),
            message: err.to_string(),
        }
    }
}

/// Numeric suffix of an existing number: leading digits after the prefix, 0 if none.
///
/// Suffixes too large for `u64` saturate so the sequence never restarts.
pub fn parse_suffix(number: &str) -> u64 {
    let digits: String = number
        .get(PREFIX_LEN..)
        .unwrap_or_default()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Check a user supplied number against the floor and return it in canonical form.
pub fn validate_number(
    kind: DocumentKind,
    input: &str,
    floor: u64,
) -> Result<String, NumberingError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix(kind.prefix()).unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(NumberingError::InvalidFormat {
            input: input.to_string(),
        });
    }

    match digits.parse::<u64>() {
        Ok(value) if value < floor => Err(NumberingError::BelowMinimum {
            minimum: kind.format_number(floor),
        }),
        Ok(value) => Ok(kind.format_number(value)),
        // All digits but wider than u64: above any floor.
        Err(_) => Ok(format!("{}{}", kind.prefix(), digits.trim_start_matches('0'))),
    }
}

/// Accepted number together with the floor it was checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberCheck {
    pub number: String,
    pub minimum: String,
}

/// Computes and validates document numbers against the account's history.
#[derive(Clone)]
pub struct SequenceGenerator {
    store: Arc<dyn RevenueStore>,
}

impl SequenceGenerator {
    pub fn new(store: Arc<dyn RevenueStore>) -> Self {
        Self { store }
    }

    /// Numeric value of the next number for `kind`.
    #[instrument(skip(self), fields(account_id = %account_id, kind = %kind))]
    pub async fn next_value(&self, account_id: Uuid, kind: DocumentKind) -> Result<u64, AppError> {
        let last = self.store.latest_document_number(account_id, kind).await?;
        let previous = last.as_deref().map(parse_suffix).unwrap_or(0);
        debug!(last = ?last, previous, "Resolved last document number");
        Ok(previous.saturating_add(1))
    }

    /// Next formatted number, e.g. `FAC-003`.
    pub async fn next_number(&self, account_id: Uuid, kind: DocumentKind) -> Result<String, AppError> {
        let value = self.next_value(account_id, kind).await?;
        Ok(kind.format_number(value))
    }

    /// Validate a manually supplied number against the current floor.
    pub async fn check_number(
        &self,
        account_id: Uuid,
        kind: DocumentKind,
        input: &str,
    ) -> Result<NumberCheck, AppError> {
        let floor = self.next_value(account_id, kind).await?;
        let number = validate_number(kind, input, floor)?;
        Ok(NumberCheck {
            number,
            minimum: kind.format_number(floor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_three_digit_padding() {
        assert_eq!(DocumentKind::Quote.format_number(3), "DEV-003");
        assert_eq!(DocumentKind::Invoice.format_number(42), "FAC-042");
        assert_eq!(DocumentKind::Invoice.format_number(1204), "FAC-1204");
    }

    #[test]
    fn suffix_parsing_defaults_to_zero() {
        assert_eq!(parse_suffix("FAC-017"), 17);
        assert_eq!(parse_suffix("DEV-9"), 9);
        assert_eq!(parse_suffix("FAC-12b"), 12);
        assert_eq!(parse_suffix("FAC-abc"), 0);
        assert_eq!(parse_suffix("FAC"), 0);
        assert_eq!(parse_suffix(""), 0);
    }

    #[test]
    fn number_below_floor_is_rejected() {
        let err = validate_number(DocumentKind::Invoice, "FAC-002", 5).unwrap_err();
        assert_eq!(
            err,
            NumberingError::BelowMinimum {
                minimum: "FAC-005".to_string()
            }
        );
        assert_eq!(err.key(), "numbering.below_minimum");
    }

    #[test]
    fn number_at_or_above_floor_is_accepted() {
        assert_eq!(
            validate_number(DocumentKind::Invoice, "FAC-006", 5),
            Ok("FAC-006".to_string())
        );
        assert_eq!(
            validate_number(DocumentKind::Invoice, "FAC-005", 5),
            Ok("FAC-005".to_string())
        );
        assert_eq!(
            validate_number(DocumentKind::Quote, "12", 5),
            Ok("DEV-012".to_string())
        );
    }

    #[test]
    fn suffix_wider_than_u32_keeps_counting() {
        assert_eq!(parse_suffix("FAC-4294967296"), 4_294_967_296);
        assert_eq!(DocumentKind::Invoice.format_number(4_294_967_297), "FAC-4294967297");
        // Beyond u64 the suffix saturates instead of restarting at 1.
        assert_eq!(parse_suffix("FAC-99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn large_manual_numbers_are_accepted() {
        assert_eq!(
            validate_number(DocumentKind::Invoice, "FAC-4294967296", 5),
            Ok("FAC-4294967296".to_string())
        );
        assert_eq!(
            validate_number(DocumentKind::Invoice, "FAC-000123456789012345678901", 5),
            Ok("FAC-123456789012345678901".to_string())
        );
    }

    #[test]
    fn non_numeric_number_is_rejected() {
        for input in ["FAC-abc", "FAC-", "FAC-1a", "-3", "DEV-004"] {
            let err = validate_number(DocumentKind::Invoice, input, 1).unwrap_err();
            assert_eq!(err.key(), "numbering.invalid_format", "input {input}");
        }
    }

    #[test]
    fn numbering_error_maps_to_invalid_input() {
        let err: AppError = NumberingError::InvalidFormat {
            input: "x".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            AppError::InvalidInput {
                key: "numbering.invalid_format",
                ..
            }
        ));
    }
}
