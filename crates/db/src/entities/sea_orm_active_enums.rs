//! Database enum definitions mirrored from the core domain.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use prestia_core::ledger::{EntrySource as CoreEntrySource, EntryType as CoreEntryType};
use prestia_core::loan::LoanStatus as CoreLoanStatus;
use prestia_core::payment::{BatchStatus, PaymentMethod as CorePaymentMethod};

/// Loan lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
pub enum LoanStatus {
    /// Loan is being collected.
    #[sea_orm(string_value = "active")]
    Active,
    /// Loan has been fully paid.
    #[sea_orm(string_value = "finished")]
    Finished,
    /// Loan is flagged as unlikely to be collected in full.
    #[sea_orm(string_value = "bad_debt")]
    BadDebt,
}

impl From<CoreLoanStatus> for LoanStatus {
    fn from(status: CoreLoanStatus) -> Self {
        match status {
            CoreLoanStatus::Active => Self::Active,
            CoreLoanStatus::Finished => Self::Finished,
            CoreLoanStatus::BadDebt => Self::BadDebt,
        }
    }
}

impl From<LoanStatus> for CoreLoanStatus {
    fn from(status: LoanStatus) -> Self {
        match status {
            LoanStatus::Active => Self::Active,
            LoanStatus::Finished => Self::Finished,
            LoanStatus::BadDebt => Self::BadDebt,
        }
    }
}

/// How a payment was received.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    /// Collected in cash by the field agent.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Received directly on the bank account.
    #[sea_orm(string_value = "money_transfer")]
    MoneyTransfer,
}

impl From<CorePaymentMethod> for PaymentMethod {
    fn from(method: CorePaymentMethod) -> Self {
        match method {
            CorePaymentMethod::Cash => Self::Cash,
            CorePaymentMethod::MoneyTransfer => Self::MoneyTransfer,
        }
    }
}

impl From<PaymentMethod> for CorePaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::MoneyTransfer => Self::MoneyTransfer,
        }
    }
}

/// Completion status of a collection batch.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "batch_payment_status")]
pub enum BatchPaymentStatus {
    /// The agent collected at least the expected amount.
    #[sea_orm(string_value = "complete")]
    Complete,
    /// The agent collected less than expected.
    #[sea_orm(string_value = "partial")]
    Partial,
}

impl From<BatchStatus> for BatchPaymentStatus {
    fn from(status: BatchStatus) -> Self {
        match status {
            BatchStatus::Complete => Self::Complete,
            BatchStatus::Partial => Self::Partial,
        }
    }
}

/// Type of ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
pub enum EntryType {
    /// Debit entry (decreases the account's balance).
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit entry (increases the account's balance).
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<CoreEntryType> for EntryType {
    fn from(entry_type: CoreEntryType) -> Self {
        match entry_type {
            CoreEntryType::Debit => Self::Debit,
            CoreEntryType::Credit => Self::Credit,
        }
    }
}

impl From<EntryType> for CoreEntryType {
    fn from(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Debit => Self::Debit,
            EntryType::Credit => Self::Credit,
        }
    }
}

/// Why a ledger entry exists.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
pub enum EntrySource {
    /// Cash disbursed when a loan is granted.
    #[sea_orm(string_value = "loan_grant")]
    LoanGrant,
    /// Commission paid out at loan grant time.
    #[sea_orm(string_value = "loan_grant_comission")]
    LoanGrantComission,
    /// A loan payment collected in cash.
    #[sea_orm(string_value = "cash_loan_payment")]
    CashLoanPayment,
    /// A loan payment received by bank transfer.
    #[sea_orm(string_value = "bank_loan_payment")]
    BankLoanPayment,
    /// Commission paid to the collector for a payment.
    #[sea_orm(string_value = "payment_comission")]
    PaymentComission,
    /// Incoming side of a paired transfer.
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    /// Outgoing side of a paired transfer.
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    /// Reconciliation repair entry.
    #[sea_orm(string_value = "balance_adjustment")]
    BalanceAdjustment,
    /// A field agent's reported cash shortage.
    #[sea_orm(string_value = "falco_loss")]
    FalcoLoss,
    /// A later compensation against a reported shortage.
    #[sea_orm(string_value = "falco_compensation")]
    FalcoCompensation,
}

impl From<CoreEntrySource> for EntrySource {
    fn from(source: CoreEntrySource) -> Self {
        match source {
            CoreEntrySource::LoanGrant => Self::LoanGrant,
            CoreEntrySource::LoanGrantComission => Self::LoanGrantComission,
            CoreEntrySource::CashLoanPayment => Self::CashLoanPayment,
            CoreEntrySource::BankLoanPayment => Self::BankLoanPayment,
            CoreEntrySource::PaymentComission => Self::PaymentComission,
            CoreEntrySource::TransferIn => Self::TransferIn,
            CoreEntrySource::TransferOut => Self::TransferOut,
            CoreEntrySource::BalanceAdjustment => Self::BalanceAdjustment,
            CoreEntrySource::FalcoLoss => Self::FalcoLoss,
            CoreEntrySource::FalcoCompensation => Self::FalcoCompensation,
        }
    }
}

impl From<EntrySource> for CoreEntrySource {
    fn from(source: EntrySource) -> Self {
        match source {
            EntrySource::LoanGrant => Self::LoanGrant,
            EntrySource::LoanGrantComission => Self::LoanGrantComission,
            EntrySource::CashLoanPayment => Self::CashLoanPayment,
            EntrySource::BankLoanPayment => Self::BankLoanPayment,
            EntrySource::PaymentComission => Self::PaymentComission,
            EntrySource::TransferIn => Self::TransferIn,
            EntrySource::TransferOut => Self::TransferOut,
            EntrySource::BalanceAdjustment => Self::BalanceAdjustment,
            EntrySource::FalcoLoss => Self::FalcoLoss,
            EntrySource::FalcoCompensation => Self::FalcoCompensation,
        }
    }
}

/// What a balance-holding account represents.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
pub enum AccountKind {
    /// A route's cash fund, carried by its field agents.
    #[sea_orm(string_value = "cash_fund")]
    CashFund,
    /// The shared bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// The office fund.
    #[sea_orm(string_value = "office_fund")]
    OfficeFund,
}
