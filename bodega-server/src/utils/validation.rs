//! Input validation helpers
//!
//! Centralized text length constants and validation functions. All mutation
//! entry points validate and fail fast before touching the stock ledger or
//! the order map.

use shared::error::{StoreError, StoreResult};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: item, category, customer display name
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs / image paths / payment evidence references
pub const MAX_URL_LEN: usize = 2048;

/// Delivery addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(StoreError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> StoreResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(StoreError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that a money amount (cents) is non-negative.
pub fn validate_non_negative(value: i64, field: &str) -> StoreResult<()> {
    if value < 0 {
        return Err(StoreError::validation(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    Ok(())
}

/// Validate that a quantity is positive.
pub fn validate_positive_quantity(value: u32, field: &str) -> StoreResult<()> {
    if value == 0 {
        return Err(StoreError::validation(format!("{field} must be positive")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_oversized_text() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("ok", "name", MAX_NAME_LEN).is_ok());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn optional_text_allows_absent() {
        assert!(validate_optional_text(None, "phone", MAX_SHORT_TEXT_LEN).is_ok());
        assert!(validate_optional_text(Some("999888777"), "phone", MAX_SHORT_TEXT_LEN).is_ok());
    }

    #[test]
    fn money_and_quantity_bounds() {
        assert!(validate_non_negative(0, "price").is_ok());
        assert!(validate_non_negative(-1, "price").is_err());
        assert!(validate_positive_quantity(1, "quantity").is_ok());
        assert!(validate_positive_quantity(0, "quantity").is_err());
    }
}
