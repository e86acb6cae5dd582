//! `SeaORM` entity definitions for the loan ledger.

pub mod account_entries;
pub mod accounts;
pub mod employees;
pub mod falco_compensations;
pub mod lead_payments_received;
pub mod loans;
pub mod payments;
pub mod routes;
pub mod sea_orm_active_enums;
