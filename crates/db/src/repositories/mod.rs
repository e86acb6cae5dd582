//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Methods that take a connection argument run against whatever the caller
//! supplies (a live transaction or the bare connection), so a logical
//! operation composed of several repository calls commits as one unit.

use prestia_shared::AppError;

pub mod account;
pub mod balance;
pub mod loan;
pub mod payment;

pub use account::{AccountError, AccountRepository, RouteAccounts};
pub use balance::{BalanceError, BalanceRepository};
pub use loan::{CancelLoanResult, CreateLoanRequest, FirstPayment, LoanError, LoanRepository};
pub use payment::{
    BatchLineInput, EditBatchInput, EditBatchLine, PaymentError, PaymentRepository,
    RecordBatchInput, RecordPaymentInput,
};

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(id) => Self::NotFound(format!("account {id}")),
            AccountError::EmployeeNotFound(id) => Self::NotFound(format!("employee {id}")),
            AccountError::EmployeeWithoutRoute(id) => {
                Self::BusinessRule(format!("employee {id} is not assigned to a route"))
            }
            AccountError::RouteCashAccountNotFound(id) => {
                Self::NotFound(format!("cash fund for route {id}"))
            }
            AccountError::BankAccountNotFound => Self::NotFound("bank account".to_string()),
            AccountError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        use prestia_core::ledger::LedgerError;

        match err {
            BalanceError::EntryNotFound(id) => Self::NotFound(format!("ledger entry {id}")),
            BalanceError::Ledger(LedgerError::InvalidAmount(amount)) => Self::InvalidAmount(amount),
            BalanceError::Ledger(err) => Self::Validation(err.to_string()),
            BalanceError::Account(err) => err.into(),
            BalanceError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        use prestia_core::payment::PaymentError as Rule;

        match err {
            PaymentError::LoanNotFound(id) => Self::NotFound(format!("loan {id}")),
            PaymentError::PaymentNotFound(id) => Self::NotFound(format!("payment {id}")),
            PaymentError::BatchNotFound(id) => Self::NotFound(format!("batch {id}")),
            PaymentError::Rule(Rule::ExceedsRemaining {
                requested,
                remaining,
            }) => Self::ExceedsRemaining {
                requested,
                remaining,
            },
            PaymentError::Rule(Rule::InvalidAmount(amount)) => Self::InvalidAmount(amount),
            PaymentError::Balance(err) => err.into(),
            PaymentError::Account(err) => err.into(),
            PaymentError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

impl From<LoanError> for AppError {
    fn from(err: LoanError) -> Self {
        match err {
            LoanError::NotFound(id) => Self::NotFound(format!("loan {id}")),
            LoanError::AlreadyRenewed {
                previous,
                successor,
            } => Self::BusinessRule(format!(
                "loan {previous} was already renewed by loan {successor}"
            )),
            LoanError::Payment(err) => err.into(),
            LoanError::Balance(err) => err.into(),
            LoanError::Account(err) => err.into(),
            LoanError::Database(err) => Self::Database(err.to_string()),
        }
    }
}
