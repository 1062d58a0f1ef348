//! Money calculation utilities using rust_decimal for precision
//!
//! This module provides precise decimal arithmetic for monetary calculations.
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;

use crate::billing::BillingError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed payment amount (1,000,000)
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), BillingError> {
    if !value.is_finite() {
        return Err(BillingError::InvalidOperation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a payment amount before it is recorded
pub fn validate_payment_amount(amount: f64) -> Result<(), BillingError> {
    require_finite(amount, "payment amount").map_err(|_| BillingError::InvalidAmount)?;
    if amount <= 0.0 {
        return Err(BillingError::InvalidAmount);
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(BillingError::InvalidOperation(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Validate a late-checkout penalty (zero is a valid "no penalty")
pub fn validate_penalty(penalty: f64) -> Result<(), BillingError> {
    require_finite(penalty, "penalty")?;
    if penalty < 0.0 {
        return Err(BillingError::InvalidOperation(format!(
            "penalty must be non-negative, got {}",
            penalty
        )));
    }
    if penalty > MAX_PAYMENT_AMOUNT {
        return Err(BillingError::InvalidOperation(format!(
            "penalty exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, penalty
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_money(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}
