//! Double-entry ledger planning.
//!
//! This module implements the pure half of the ledger:
//! - Entry types and the closed set of entry sources
//! - Planned entries (validated before persistence)
//! - Paired transfers and additive reversals
//! - Balance reconciliation and repair arithmetic
//!
//! The persistent half (appending rows, mutating materialized balances)
//! lives in the database crate and consumes the plans produced here.

pub mod entry;
pub mod error;
pub mod reconcile;
pub mod service;

#[cfg(test)]
mod service_props;

pub use entry::{EntrySource, EntryType, NewEntry};
pub use error::LedgerError;
pub use reconcile::Reconciliation;
pub use service::{LedgerService, ReversalSource, TransferPlan};
