//! Application-wide error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ledger entry amount must be positive.
    #[error("Invalid amount: {0} (entry amounts must be positive)")]
    InvalidAmount(Decimal),

    /// Shortage compensation over-claims the uncompensated remainder.
    #[error("Compensation {requested} exceeds remaining shortage {remaining}")]
    ExceedsRemaining {
        /// The requested compensation amount.
        requested: Decimal,
        /// The still-uncompensated remainder.
        remaining: Decimal,
    },

    /// Stored data implies an impossible state (corrupt historical data).
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for callers that key on stable strings.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::ExceedsRemaining { .. } => "EXCEEDS_REMAINING",
            Self::InconsistentState(_) => "INCONSISTENT_STATE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::InvalidAmount(dec!(-5)).error_code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            AppError::ExceedsRemaining {
                requested: dec!(100),
                remaining: dec!(40),
            }
            .error_code(),
            "EXCEEDS_REMAINING"
        );
        assert_eq!(
            AppError::InconsistentState(String::new()).error_code(),
            "INCONSISTENT_STATE"
        );
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("loan 42".into()).to_string(),
            "Not found: loan 42"
        );
        assert_eq!(
            AppError::InvalidAmount(dec!(0)).to_string(),
            "Invalid amount: 0 (entry amounts must be positive)"
        );
        assert_eq!(
            AppError::ExceedsRemaining {
                requested: dec!(100.00),
                remaining: dec!(40.00),
            }
            .to_string(),
            "Compensation 100.00 exceeds remaining shortage 40.00"
        );
    }
}
