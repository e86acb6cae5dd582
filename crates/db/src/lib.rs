//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the loan ledger
//! - Repository abstractions for data access
//!
//! Every mutating repository operation runs inside one database transaction
//! per logical action: either the caller hands one in through the `*_in_txn`
//! surface, or the top-level operation opens and commits its own.

pub mod entities;
pub mod repositories;

pub use repositories::{
    AccountRepository, BalanceRepository, LoanRepository, PaymentRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
