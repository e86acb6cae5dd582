//! Payment error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by payment rules.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A shortage compensation claims more than is still uncompensated.
    #[error("Compensation {requested} exceeds remaining shortage {remaining}")]
    ExceedsRemaining {
        /// The requested compensation amount.
        requested: Decimal,
        /// The still-uncompensated remainder.
        remaining: Decimal,
    },

    /// Payment amounts must be positive.
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),
}
