//! Renewal inheritance policy.

use prestia_shared::types::money::{ratio_or_zero, round_currency};
use rust_decimal::Decimal;

use super::types::PreviousLoanData;

/// What a renewal carries over from its predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalCarryover {
    /// Profit re-added to the new loan from the predecessor's pending balance.
    pub profit_inherited: Decimal,
    /// Cash actually disbursed: requested minus the settled pending, floored at zero.
    pub amount_gived: Decimal,
    /// The predecessor pending the renewal settles (retained so a later
    /// cancellation can reopen the predecessor).
    pub pending_settled: Decimal,
}

/// Domain rule for refinancing a loan before it is fully paid.
///
/// The renewal settles the predecessor's ENTIRE pending balance out of the
/// requested amount, but only the profit fraction of that balance is re-added
/// to the new loan as inherited profit; the capital fraction is simply repaid.
/// This is a business policy, not an engineering constraint: the lender keeps
/// the profit it already earned on the old loan instead of waiving it.
pub struct RenewalInheritancePolicy;

impl RenewalInheritancePolicy {
    /// Applies the policy to a predecessor's figures.
    #[must_use]
    pub fn apply(requested_amount: Decimal, previous: &PreviousLoanData) -> RenewalCarryover {
        let profit_fraction = ratio_or_zero(previous.profit_amount, previous.total_debt);
        let profit_inherited = round_currency(previous.pending_amount * profit_fraction);
        let amount_gived = (requested_amount - previous.pending_amount).max(Decimal::ZERO);

        RenewalCarryover {
            profit_inherited,
            amount_gived,
            pending_settled: previous.pending_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inherits_profit_fraction_of_pending() {
        let previous = PreviousLoanData {
            pending_amount: dec!(1200),
            profit_amount: dec!(1200),
            total_debt: dec!(4200),
        };

        let carryover = RenewalInheritancePolicy::apply(dec!(3000), &previous);

        // 1200 * (1200 / 4200) = 342.857... -> 342.86
        assert_eq!(carryover.profit_inherited, dec!(342.86));
        assert_eq!(carryover.amount_gived, dec!(1800));
        assert_eq!(carryover.pending_settled, dec!(1200));
    }

    #[test]
    fn test_pending_larger_than_requested_floors_disbursement() {
        let previous = PreviousLoanData {
            pending_amount: dec!(3500),
            profit_amount: dec!(1000),
            total_debt: dec!(3500),
        };

        let carryover = RenewalInheritancePolicy::apply(dec!(3000), &previous);

        assert_eq!(carryover.amount_gived, Decimal::ZERO);
    }

    #[test]
    fn test_zero_total_debt_inherits_nothing() {
        let previous = PreviousLoanData {
            pending_amount: dec!(500),
            profit_amount: dec!(100),
            total_debt: Decimal::ZERO,
        };

        let carryover = RenewalInheritancePolicy::apply(dec!(3000), &previous);

        assert_eq!(carryover.profit_inherited, Decimal::ZERO);
        assert_eq!(carryover.amount_gived, dec!(2500));
    }
}
