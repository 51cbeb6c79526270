//! Validation utilities for the Quantity Surveying Platform

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Financial Validations
// ============================================================================

/// Retention withheld from payments is capped at half the certified value.
pub fn validate_retention_percentage(pct: Decimal) -> Result<(), &'static str> {
    if pct < Decimal::ZERO || pct > Decimal::from(50) {
        return Err("Retention percentage should be between 0 and 50");
    }
    Ok(())
}

/// Generic percentage bound check for fields expressed in [0, 100].
pub fn validate_percentage_range(pct: Decimal) -> Result<(), &'static str> {
    if pct < Decimal::ZERO || pct > Decimal::from(100) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// A certificate can never pay out a negative amount; deductions exceeding
/// the gross value are a data error, not something to clamp.
pub fn validate_net_payment(net: Decimal) -> Result<(), &'static str> {
    if net < Decimal::ZERO {
        return Err("Net payment amount cannot be negative");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate that two dates are in order (both optional)
pub fn validate_date_order(earlier: Option<NaiveDate>, later: Option<NaiveDate>) -> bool {
    match (earlier, later) {
        (Some(from), Some(to)) => from <= to,
        _ => true,
    }
}

/// Validate an item code (non-empty, uppercase alphanumeric with separators)
pub fn validate_item_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Item code is required");
    }
    if code.len() > 140 {
        return Err("Item code must be at most 140 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err("Item code may only contain alphanumeric characters, '-', '_' and '.'");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}
