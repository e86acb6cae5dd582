//! Monetary rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal`; rounding is half-up
//! (`MidpointAwayFromZero`) at every step the system rounds, because
//! downstream figures are pinned to exact cent values.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// A loan is considered fully paid once its pending amount drops to this.
pub const PENDING_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// A materialized balance is consistent with its entries within this.
pub const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Rounds a currency amount to 2 decimal places, half-up.
#[must_use]
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a stored ratio to 4 decimal places, half-up.
#[must_use]
pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Total division: returns `numerator / denominator`, or zero when the
/// denominator is zero. Degenerate data must not panic the engine.
#[must_use]
pub fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}
