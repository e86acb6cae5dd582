//! Loan economics.
//!
//! This module implements the deterministic arithmetic behind loans:
//! - Creation splits (profit base, renewal inheritance, disbursed cash)
//! - Payment allocation between profit and capital return
//! - Cancellation refunds
//!
//! Everything here is pure: no I/O, no mutable state, and no panics on
//! degenerate data (zero denominators yield zero).

pub mod engine;
pub mod policy;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::LoanEngine;
pub use policy::{RenewalCarryover, RenewalInheritancePolicy};
pub use types::{
    CancelLoanInput, CancelOutcome, CreateLoanInput, LoanFigures, LoanStatus, PaymentSnapshot,
    PaymentSplit, PaymentSplitInput, PreviousLoanData,
};
