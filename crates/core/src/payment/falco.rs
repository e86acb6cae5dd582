//! Shortage (falco) compensation rules.
//!
//! A field agent's reported cash shortage can be compensated later through
//! separate payments. Compensations may arrive in any number of installments
//! but can never exceed the originally reported shortage.

use rust_decimal::Decimal;

use super::error::PaymentError;

/// The still-uncompensated remainder of a reported shortage.
#[must_use]
pub fn remaining(falco_amount: Decimal, compensated: Decimal) -> Decimal {
    (falco_amount - compensated).max(Decimal::ZERO)
}

/// Validates a new compensation against the uncompensated remainder.
///
/// # Errors
///
/// Returns [`PaymentError::InvalidAmount`] for a non-positive compensation
/// and [`PaymentError::ExceedsRemaining`] when the compensation over-claims.
pub fn validate_compensation(
    falco_amount: Decimal,
    already_compensated: Decimal,
    requested: Decimal,
) -> Result<(), PaymentError> {
    if requested <= Decimal::ZERO {
        return Err(PaymentError::InvalidAmount(requested));
    }

    let remaining = remaining(falco_amount, already_compensated);
    if requested > remaining {
        return Err(PaymentError::ExceedsRemaining {
            requested,
            remaining,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_remaining() {
        assert_eq!(remaining(dec!(100), dec!(30)), dec!(70));
        assert_eq!(remaining(dec!(100), dec!(100)), Decimal::ZERO);
        // Over-compensated historical data must not go negative.
        assert_eq!(remaining(dec!(100), dec!(120)), Decimal::ZERO);
    }

    #[test]
    fn test_validate_compensation_within_remainder() {
        assert!(validate_compensation(dec!(100), dec!(30), dec!(70)).is_ok());
        assert!(validate_compensation(dec!(100), Decimal::ZERO, dec!(1)).is_ok());
    }

    #[test]
    fn test_validate_compensation_over_claims() {
        let result = validate_compensation(dec!(100), dec!(30), dec!(71));
        assert!(matches!(
            result,
            Err(PaymentError::ExceedsRemaining { .. })
        ));
    }

    #[test]
    fn test_validate_compensation_rejects_non_positive() {
        assert!(matches!(
            validate_compensation(dec!(100), Decimal::ZERO, Decimal::ZERO),
            Err(PaymentError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_compensation(dec!(100), Decimal::ZERO, dec!(-5)),
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_fully_compensated_rejects_any_more() {
        assert!(matches!(
            validate_compensation(dec!(100), dec!(100), dec!(0.01)),
            Err(PaymentError::ExceedsRemaining { .. })
        ));
    }
}
