//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per unit
const MAX_PRICE: f64 = 10_000_000.0;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round2(value).to_f64().unwrap_or_default()
}

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * percent / 100`
#[inline]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / HUNDRED
}

/// Compare two monetary values with tolerance
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidAmount(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a strictly positive money amount (top-ups, credits, debits)
pub fn validate_positive_amount(value: f64, field_name: &str) -> Result<(), OrderError> {
    require_finite(value, field_name)?;
    if value <= 0.0 {
        return Err(OrderError::InvalidAmount(format!(
            "{} must be positive, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a catalog price
pub fn validate_price(value: f64, field_name: &str) -> Result<(), OrderError> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(OrderError::InvalidAmount(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_PRICE {
        return Err(OrderError::InvalidAmount(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate a percentage in 0..=100 (discounts, offers)
pub fn validate_percent(value: f64, field_name: &str) -> Result<(), OrderError> {
    require_finite(value, field_name)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(OrderError::InvalidAmount(format!(
            "{} must be between 0 and 100, got {}",
            field_name, value
        )));
    }
    Ok(())
}
