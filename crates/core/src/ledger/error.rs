//! Ledger error types.

use prestia_shared::types::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while planning ledger entries.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry amounts are stored as non-negative magnitudes; zero or negative
    /// amounts are rejected before anything is persisted.
    #[error("Entry amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// A transfer needs two distinct accounts.
    #[error("Transfer source and destination are the same account: {0}")]
    SameAccountTransfer(AccountId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        assert_eq!(
            LedgerError::InvalidAmount(dec!(-10)).to_string(),
            "Entry amount must be positive, got -10"
        );
    }
}
