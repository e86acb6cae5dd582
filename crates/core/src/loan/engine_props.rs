//! Property-based tests for the loan engine.
//!
//! - Split bound: the profit portion of any payment stays in `[0, amount]`
//!   and the two portions always sum back to the payment.
//! - Pending monotonicity: remaining debt never increases and never goes
//!   negative across successive payments.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::LoanEngine;
use super::types::{CreateLoanInput, PaymentSplitInput};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate non-negative decimal amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate profit rates (0.00 to 1.00).
fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..=100i64).prop_map(|pct| Decimal::new(pct, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// For any payment, `0 <= profit <= amount` and
    /// `profit + return_to_capital == amount`, even for degenerate or
    /// corrupt loan figures.
    #[test]
    fn prop_split_is_bounded_and_exhaustive(
        payment in positive_amount(),
        loan_profit in amount(),
        loan_total_debt in amount(),
        loan_pending in amount(),
        is_bad_debt in any::<bool>(),
    ) {
        let split = LoanEngine::process_payment(&PaymentSplitInput {
            amount: payment,
            loan_profit,
            loan_total_debt,
            loan_pending,
            is_bad_debt,
        });

        prop_assert!(split.profit_amount >= Decimal::ZERO);
        prop_assert!(split.profit_amount <= payment);
        prop_assert_eq!(split.profit_amount + split.return_to_capital, payment);
    }

    /// Pending debt is non-increasing across successive payments and never
    /// goes negative.
    #[test]
    fn prop_pending_is_monotonic(
        requested in positive_amount(),
        loan_rate in rate(),
        payments in prop::collection::vec(positive_amount(), 1..20),
    ) {
        let figures = LoanEngine::create_loan(
            &CreateLoanInput {
                requested_amount: requested,
                rate: loan_rate,
                week_duration: 14,
            },
            None,
        );

        let mut pending = figures.pending_amount;
        for payment in payments {
            let split = LoanEngine::process_payment(&PaymentSplitInput {
                amount: payment,
                loan_profit: figures.profit_amount,
                loan_total_debt: figures.total_debt_acquired,
                loan_pending: pending,
                is_bad_debt: false,
            });

            prop_assert!(split.new_pending <= pending);
            prop_assert!(split.new_pending >= Decimal::ZERO);
            pending = split.new_pending;
        }
    }

    /// Loan creation never disburses more than requested and never computes
    /// a negative figure.
    #[test]
    fn prop_create_loan_figures_non_negative(
        requested in positive_amount(),
        loan_rate in rate(),
        weeks in 0u32..60,
    ) {
        let figures = LoanEngine::create_loan(
            &CreateLoanInput {
                requested_amount: requested,
                rate: loan_rate,
                week_duration: weeks,
            },
            None,
        );

        prop_assert_eq!(figures.amount_gived, requested);
        prop_assert!(figures.profit_amount >= Decimal::ZERO);
        prop_assert!(figures.total_debt_acquired >= requested);
        prop_assert!(figures.profit_ratio >= Decimal::ZERO);
        prop_assert!(figures.profit_ratio <= Decimal::ONE);
    }
}
