//! Loan arithmetic engine.
//!
//! This module computes loan creation splits, payment profit/capital
//! allocation, and cancellation refunds. It contains pure functions only;
//! persistence and ledger writes happen in the repositories that consume
//! these figures.

use prestia_shared::types::money::{ratio_or_zero, round_currency, round_ratio, PENDING_EPSILON};
use rust_decimal::Decimal;
use tracing::warn;

use super::policy::RenewalInheritancePolicy;
use super::types::{
    CancelLoanInput, CancelOutcome, CreateLoanInput, LoanFigures, PaymentSplit, PaymentSplitInput,
    PreviousLoanData,
};

/// Stateless loan arithmetic.
///
/// All divisions substitute zero for a zero denominator rather than raising;
/// corrupt historical data must degrade, never panic.
pub struct LoanEngine;

impl LoanEngine {
    /// Computes the figures for a new loan.
    ///
    /// `profit_base = requested × rate`. When a predecessor is supplied the
    /// renewal carryover follows [`RenewalInheritancePolicy`]; for a first
    /// loan the inherited profit is zero and the full requested amount is
    /// disbursed. Each rounded figure uses half-up rounding to 2 decimals;
    /// the stored profit ratio keeps 4.
    #[must_use]
    pub fn create_loan(input: &CreateLoanInput, previous: Option<&PreviousLoanData>) -> LoanFigures {
        let profit_base = round_currency(input.requested_amount * input.rate);

        let (profit_inherited, amount_gived) = match previous {
            Some(prev) => {
                let carryover = RenewalInheritancePolicy::apply(input.requested_amount, prev);
                (carryover.profit_inherited, carryover.amount_gived)
            }
            None => (Decimal::ZERO, input.requested_amount),
        };

        let profit_amount = profit_base + profit_inherited;
        let total_debt_acquired = input.requested_amount + profit_amount;
        let expected_weekly_payment = round_currency(ratio_or_zero(
            total_debt_acquired,
            Decimal::from(input.week_duration),
        ));
        let profit_ratio = round_ratio(ratio_or_zero(profit_amount, total_debt_acquired));

        LoanFigures {
            amount_gived,
            profit_base,
            profit_inherited,
            profit_amount,
            total_debt_acquired,
            pending_amount: total_debt_acquired,
            expected_weekly_payment,
            profit_ratio,
        }
    }

    /// Allocates a payment between profit and capital return.
    ///
    /// Bad-debt loans allocate the full payment to profit (collection
    /// incentive on defaulted debt). A zero total debt allocates the full
    /// payment to capital. Otherwise the profit portion follows the loan's
    /// profit ratio, clamped into `[0, amount]` when stored figures imply an
    /// impossible split.
    #[must_use]
    pub fn process_payment(input: &PaymentSplitInput) -> PaymentSplit {
        let profit_amount = if input.is_bad_debt {
            input.amount
        } else if input.loan_total_debt.is_zero() {
            Decimal::ZERO
        } else {
            let raw = round_currency(input.amount * input.loan_profit / input.loan_total_debt);
            if raw > input.amount || raw < Decimal::ZERO {
                // Corrupt historical data, not a call-site error: log and clamp.
                warn!(
                    computed = %raw,
                    payment = %input.amount,
                    "payment split out of bounds, clamping"
                );
            }
            raw.clamp(Decimal::ZERO, input.amount.max(Decimal::ZERO))
        };

        let return_to_capital = input.amount - profit_amount;
        let new_pending = (input.loan_pending - input.amount).max(Decimal::ZERO);

        PaymentSplit {
            profit_amount,
            return_to_capital,
            new_pending,
            is_fully_paid: new_pending <= PENDING_EPSILON,
        }
    }

    /// Computes the refund for cancelling a loan.
    ///
    /// The base refund is the disbursed cash plus the grant commission. A
    /// single payment received on the sign date is treated as an advance
    /// first payment and deducted (floored at zero). Any other payment
    /// history implies real collection activity: nothing is deducted and the
    /// outcome reports the untouched payments for operator review.
    #[must_use]
    pub fn cancel_loan(input: &CancelLoanInput) -> CancelOutcome {
        let base_refund = input.amount_gived + input.comission_amount;

        match input.payments.as_slice() {
            [] => CancelOutcome {
                amount_to_restore: base_refund,
                first_payment_deducted: false,
                has_unaffected_payments: false,
                unaffected_payments_count: 0,
                unaffected_payments_amount: Decimal::ZERO,
            },
            [only] if only.received_on == input.sign_date => CancelOutcome {
                amount_to_restore: (base_refund - only.amount).max(Decimal::ZERO),
                first_payment_deducted: true,
                has_unaffected_payments: false,
                unaffected_payments_count: 0,
                unaffected_payments_amount: Decimal::ZERO,
            },
            payments => CancelOutcome {
                amount_to_restore: base_refund,
                first_payment_deducted: false,
                has_unaffected_payments: true,
                unaffected_payments_count: payments.len(),
                unaffected_payments_amount: payments.iter().map(|p| p.amount).sum(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::types::PaymentSnapshot;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_first_loan() {
        let figures = LoanEngine::create_loan(
            &CreateLoanInput {
                requested_amount: dec!(3000),
                rate: dec!(0.40),
                week_duration: 14,
            },
            None,
        );

        assert_eq!(figures.profit_base, dec!(1200.00));
        assert_eq!(figures.profit_inherited, Decimal::ZERO);
        assert_eq!(figures.profit_amount, dec!(1200.00));
        assert_eq!(figures.total_debt_acquired, dec!(4200.00));
        assert_eq!(figures.amount_gived, dec!(3000));
        assert_eq!(figures.pending_amount, dec!(4200.00));
        assert_eq!(figures.expected_weekly_payment, dec!(300.00));
        // 1200 / 4200 = 0.285714... -> 0.2857
        assert_eq!(figures.profit_ratio, dec!(0.2857));
    }

    #[test]
    fn test_create_renewal_inherits_profit() {
        let previous = PreviousLoanData {
            pending_amount: dec!(1200),
            profit_amount: dec!(1200),
            total_debt: dec!(4200),
        };

        let figures = LoanEngine::create_loan(
            &CreateLoanInput {
                requested_amount: dec!(3000),
                rate: dec!(0.40),
                week_duration: 14,
            },
            Some(&previous),
        );

        assert_eq!(figures.profit_base, dec!(1200.00));
        assert_eq!(figures.profit_inherited, dec!(342.86));
        assert_eq!(figures.profit_amount, dec!(1542.86));
        assert_eq!(figures.total_debt_acquired, dec!(4542.86));
        assert_eq!(figures.amount_gived, dec!(1800));
        assert_eq!(figures.expected_weekly_payment, dec!(324.49));
    }

    #[test]
    fn test_create_loan_zero_week_duration() {
        let figures = LoanEngine::create_loan(
            &CreateLoanInput {
                requested_amount: dec!(3000),
                rate: dec!(0.40),
                week_duration: 0,
            },
            None,
        );

        assert_eq!(figures.expected_weekly_payment, Decimal::ZERO);
    }

    #[test]
    fn test_process_payment_normal_split() {
        let split = LoanEngine::process_payment(&PaymentSplitInput {
            amount: dec!(300),
            loan_profit: dec!(1200),
            loan_total_debt: dec!(4200),
            loan_pending: dec!(4200),
            is_bad_debt: false,
        });

        // 300 * 1200 / 4200 = 85.714... -> 85.71
        assert_eq!(split.profit_amount, dec!(85.71));
        assert_eq!(split.return_to_capital, dec!(214.29));
        assert_eq!(split.new_pending, dec!(3900));
        assert!(!split.is_fully_paid);
    }

    #[test]
    fn test_process_payment_bad_debt_is_all_profit() {
        let split = LoanEngine::process_payment(&PaymentSplitInput {
            amount: dec!(300),
            loan_profit: dec!(1200),
            loan_total_debt: dec!(4200),
            loan_pending: dec!(900),
            is_bad_debt: true,
        });

        assert_eq!(split.profit_amount, dec!(300));
        assert_eq!(split.return_to_capital, Decimal::ZERO);
    }

    #[test]
    fn test_process_payment_zero_debt_is_all_capital() {
        let split = LoanEngine::process_payment(&PaymentSplitInput {
            amount: dec!(300),
            loan_profit: dec!(1200),
            loan_total_debt: Decimal::ZERO,
            loan_pending: dec!(900),
            is_bad_debt: false,
        });

        assert_eq!(split.profit_amount, Decimal::ZERO);
        assert_eq!(split.return_to_capital, dec!(300));
    }

    #[test]
    fn test_process_payment_clamps_corrupt_ratio() {
        // Stored profit exceeds total debt: the raw split would exceed the
        // payment itself.
        let split = LoanEngine::process_payment(&PaymentSplitInput {
            amount: dec!(100),
            loan_profit: dec!(5000),
            loan_total_debt: dec!(1000),
            loan_pending: dec!(1000),
            is_bad_debt: false,
        });

        assert_eq!(split.profit_amount, dec!(100));
        assert_eq!(split.return_to_capital, Decimal::ZERO);
    }

    #[test]
    fn test_process_payment_overpayment_floors_pending() {
        let split = LoanEngine::process_payment(&PaymentSplitInput {
            amount: dec!(500),
            loan_profit: dec!(1200),
            loan_total_debt: dec!(4200),
            loan_pending: dec!(300),
            is_bad_debt: false,
        });

        assert_eq!(split.new_pending, Decimal::ZERO);
        assert!(split.is_fully_paid);
    }

    #[test]
    fn test_process_payment_residual_cent_finishes_loan() {
        let split = LoanEngine::process_payment(&PaymentSplitInput {
            amount: dec!(299.99),
            loan_profit: dec!(1200),
            loan_total_debt: dec!(4200),
            loan_pending: dec!(300),
            is_bad_debt: false,
        });

        assert_eq!(split.new_pending, dec!(0.01));
        assert!(split.is_fully_paid);
    }

    #[test]
    fn test_cancel_loan_no_payments() {
        let outcome = LoanEngine::cancel_loan(&CancelLoanInput {
            amount_gived: dec!(3000),
            comission_amount: dec!(50),
            sign_date: date(2024, 1, 15),
            payments: vec![],
        });

        assert_eq!(outcome.amount_to_restore, dec!(3050));
        assert!(!outcome.first_payment_deducted);
        assert!(!outcome.has_unaffected_payments);
    }

    #[test]
    fn test_cancel_loan_same_day_first_payment_deducted() {
        let outcome = LoanEngine::cancel_loan(&CancelLoanInput {
            amount_gived: dec!(3000),
            comission_amount: dec!(50),
            sign_date: date(2024, 1, 15),
            payments: vec![PaymentSnapshot {
                amount: dec!(300),
                received_on: date(2024, 1, 15),
            }],
        });

        assert_eq!(outcome.amount_to_restore, dec!(2750));
        assert!(outcome.first_payment_deducted);
        assert!(!outcome.has_unaffected_payments);
    }

    #[test]
    fn test_cancel_loan_single_later_payment_untouched() {
        let outcome = LoanEngine::cancel_loan(&CancelLoanInput {
            amount_gived: dec!(3000),
            comission_amount: dec!(50),
            sign_date: date(2024, 1, 15),
            payments: vec![PaymentSnapshot {
                amount: dec!(300),
                received_on: date(2024, 1, 22),
            }],
        });

        assert_eq!(outcome.amount_to_restore, dec!(3050));
        assert!(!outcome.first_payment_deducted);
        assert!(outcome.has_unaffected_payments);
        assert_eq!(outcome.unaffected_payments_count, 1);
        assert_eq!(outcome.unaffected_payments_amount, dec!(300));
    }

    #[test]
    fn test_cancel_loan_multiple_payments_untouched() {
        let outcome = LoanEngine::cancel_loan(&CancelLoanInput {
            amount_gived: dec!(3000),
            comission_amount: dec!(50),
            sign_date: date(2024, 1, 15),
            payments: vec![
                PaymentSnapshot {
                    amount: dec!(300),
                    received_on: date(2024, 1, 22),
                },
                PaymentSnapshot {
                    amount: dec!(300),
                    received_on: date(2024, 1, 29),
                },
            ],
        });

        assert_eq!(outcome.amount_to_restore, dec!(3050));
        assert!(outcome.has_unaffected_payments);
        assert_eq!(outcome.unaffected_payments_count, 2);
        assert_eq!(outcome.unaffected_payments_amount, dec!(600));
    }

    #[test]
    fn test_cancel_loan_large_same_day_payment_floors_at_zero() {
        let outcome = LoanEngine::cancel_loan(&CancelLoanInput {
            amount_gived: dec!(100),
            comission_amount: dec!(10),
            sign_date: date(2024, 1, 15),
            payments: vec![PaymentSnapshot {
                amount: dec!(500),
                received_on: date(2024, 1, 15),
            }],
        });

        assert_eq!(outcome.amount_to_restore, Decimal::ZERO);
        assert!(outcome.first_payment_deducted);
    }
}
