//! Payment collection logic.
//!
//! This module implements the pure half of payment orchestration:
//! - Per-line and per-batch cash/bank effects
//! - The before/after snapshot diff that nets a batch edit
//! - Shortage (falco) compensation rules
//!
//! The repositories turn these values into rows and balance writes.

pub mod batch;
pub mod error;
pub mod falco;
pub mod types;

#[cfg(test)]
mod batch_props;

pub use batch::{batch_effect, line_effect, BatchDiff, BatchTotals, LineChange};
pub use error::PaymentError;
pub use types::{AccountDeltas, BatchStatus, PaymentLine, PaymentMethod};
