//! Loan domain types for creation, payment allocation, and cancellation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Loan lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Loan is being collected.
    Active,
    /// Loan has been fully paid (pending amount reached zero).
    Finished,
    /// Loan is flagged as unlikely to be collected in full.
    BadDebt,
}

impl LoanStatus {
    /// Returns true if payments against this loan allocate 100% to profit.
    #[must_use]
    pub fn is_bad_debt(&self) -> bool {
        matches!(self, Self::BadDebt)
    }
}

/// Input for computing a new loan's figures.
#[derive(Debug, Clone)]
pub struct CreateLoanInput {
    /// The amount the client requested.
    pub requested_amount: Decimal,
    /// The profit rate applied to the requested amount (e.g. 0.40).
    pub rate: Decimal,
    /// The repayment term in weeks.
    pub week_duration: u32,
}

/// The fields of a predecessor loan a renewal needs.
#[derive(Debug, Clone)]
pub struct PreviousLoanData {
    /// Remaining debt on the predecessor.
    pub pending_amount: Decimal,
    /// The predecessor's total profit.
    pub profit_amount: Decimal,
    /// The predecessor's total debt acquired.
    pub total_debt: Decimal,
}

/// Computed figures for a new loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanFigures {
    /// Cash actually disbursed (requested minus a renewal's settled pending).
    pub amount_gived: Decimal,
    /// Profit earned on the requested amount.
    pub profit_base: Decimal,
    /// Profit carried over from the predecessor's pending balance.
    pub profit_inherited: Decimal,
    /// Total profit: base + inherited.
    pub profit_amount: Decimal,
    /// Total debt the client acquires: requested + profit.
    pub total_debt_acquired: Decimal,
    /// Remaining debt; starts equal to the total debt.
    pub pending_amount: Decimal,
    /// Expected weekly payment over the term.
    pub expected_weekly_payment: Decimal,
    /// Fraction of the total debt that is profit (4 decimal places).
    pub profit_ratio: Decimal,
}

/// Input for allocating one payment between profit and capital.
#[derive(Debug, Clone)]
pub struct PaymentSplitInput {
    /// The payment amount.
    pub amount: Decimal,
    /// The loan's total profit.
    pub loan_profit: Decimal,
    /// The loan's total debt acquired.
    pub loan_total_debt: Decimal,
    /// The loan's remaining debt before this payment.
    pub loan_pending: Decimal,
    /// Whether the loan is flagged as bad debt.
    pub is_bad_debt: bool,
}

/// A payment's allocation between profit and capital return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSplit {
    /// The profit portion of the payment.
    pub profit_amount: Decimal,
    /// The capital-return portion of the payment.
    pub return_to_capital: Decimal,
    /// The loan's remaining debt after this payment (never negative).
    pub new_pending: Decimal,
    /// Whether this payment settles the loan.
    pub is_fully_paid: bool,
}

/// A payment as seen by the cancellation calculation.
#[derive(Debug, Clone)]
pub struct PaymentSnapshot {
    /// The payment amount.
    pub amount: Decimal,
    /// The calendar day the payment was received.
    pub received_on: NaiveDate,
}

/// Input for computing a loan cancellation refund.
#[derive(Debug, Clone)]
pub struct CancelLoanInput {
    /// Cash disbursed when the loan was granted.
    pub amount_gived: Decimal,
    /// Commission paid out at grant time.
    pub comission_amount: Decimal,
    /// The loan's sign date.
    pub sign_date: NaiveDate,
    /// Every payment recorded against the loan.
    pub payments: Vec<PaymentSnapshot>,
}

/// Result of a loan cancellation calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    /// The amount to restore to the disbursing account.
    pub amount_to_restore: Decimal,
    /// True when a same-day single payment was treated as an advance and
    /// deducted from the refund.
    pub first_payment_deducted: bool,
    /// True when payments exist that were NOT refunded automatically and
    /// need operator review.
    pub has_unaffected_payments: bool,
    /// How many payments were left untouched.
    pub unaffected_payments_count: usize,
    /// Their total amount.
    pub unaffected_payments_amount: Decimal,
}
