//! Ledger entry domain types.

use chrono::NaiveDate;
use prestia_shared::types::{AccountId, LeadPaymentId, LoanId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry (decreases the account's balance).
    Debit,
    /// Credit entry (increases the account's balance).
    Credit,
}

impl EntryType {
    /// Returns the opposite entry type.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Returns the signed balance effect of an entry of this type.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => -amount,
            Self::Credit => amount,
        }
    }
}

/// Why a ledger entry exists.
///
/// This is a closed set: every balance movement in the system traces back to
/// one of these causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Cash disbursed when a loan is granted.
    LoanGrant,
    /// Commission paid out at loan grant time.
    LoanGrantComission,
    /// A loan payment collected in cash.
    CashLoanPayment,
    /// A loan payment received by bank transfer.
    BankLoanPayment,
    /// Commission paid to the collector for a payment.
    PaymentComission,
    /// Incoming side of a paired transfer.
    TransferIn,
    /// Outgoing side of a paired transfer.
    TransferOut,
    /// Reconciliation repair entry.
    BalanceAdjustment,
    /// A field agent's reported cash shortage.
    FalcoLoss,
    /// A later compensation against a reported shortage.
    FalcoCompensation,
}

/// A validated, not-yet-persisted ledger entry.
///
/// Entries are append-only once persisted; this type is the planning stage
/// where amounts have been checked and the balance effect is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// The account the entry posts to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Non-negative magnitude.
    pub amount: Decimal,
    /// Why the entry exists.
    pub source: EntrySource,
    /// Profit portion of the underlying payment, when applicable.
    pub profit_amount: Option<Decimal>,
    /// Capital-return portion of the underlying payment, when applicable.
    pub return_to_capital: Option<Decimal>,
    /// The loan this entry belongs to, if any.
    pub loan_id: Option<LoanId>,
    /// The payment this entry belongs to, if any.
    pub payment_id: Option<PaymentId>,
    /// The batch this entry belongs to, if any.
    pub lead_payment_id: Option<LeadPaymentId>,
    /// The other account of a paired transfer.
    pub destination_account_id: Option<AccountId>,
    /// Idempotency/dedup key.
    pub sync_id: Uuid,
    /// The business date of the entry.
    pub entry_date: NaiveDate,
    /// Free-form description.
    pub description: Option<String>,
}

impl NewEntry {
    /// Creates a bare entry; link fields default to `None`.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        entry_type: EntryType,
        amount: Decimal,
        source: EntrySource,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            entry_type,
            amount,
            source,
            profit_amount: None,
            return_to_capital: None,
            loan_id: None,
            payment_id: None,
            lead_payment_id: None,
            destination_account_id: None,
            sync_id: Uuid::new_v4(),
            entry_date,
            description: None,
        }
    }

    /// Attaches the profit/capital split for reporting.
    #[must_use]
    pub fn with_split(mut self, profit: Decimal, return_to_capital: Decimal) -> Self {
        self.profit_amount = Some(profit);
        self.return_to_capital = Some(return_to_capital);
        self
    }

    /// Links the entry to a loan.
    #[must_use]
    pub fn with_loan(mut self, loan_id: LoanId) -> Self {
        self.loan_id = Some(loan_id);
        self
    }

    /// Links the entry to a payment.
    #[must_use]
    pub fn with_payment(mut self, payment_id: PaymentId) -> Self {
        self.payment_id = Some(payment_id);
        self
    }

    /// Links the entry to a batch.
    #[must_use]
    pub fn with_lead_payment(mut self, lead_payment_id: LeadPaymentId) -> Self {
        self.lead_payment_id = Some(lead_payment_id);
        self
    }

    /// Records the other account of a paired transfer.
    #[must_use]
    pub fn with_destination(mut self, destination: AccountId) -> Self {
        self.destination_account_id = Some(destination);
        self
    }

    /// Sets the free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the signed effect of this entry on the account balance.
    #[must_use]
    pub fn balance_delta(&self) -> Decimal {
        self.entry_type.signed(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_amounts() {
        assert_eq!(EntryType::Credit.signed(dec!(100)), dec!(100));
        assert_eq!(EntryType::Debit.signed(dec!(100)), dec!(-100));
    }

    #[test]
    fn test_opposite() {
        assert_eq!(EntryType::Debit.opposite(), EntryType::Credit);
        assert_eq!(EntryType::Credit.opposite(), EntryType::Debit);
    }

    #[test]
    fn test_balance_delta_follows_entry_type() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let account = AccountId::new();

        let credit = NewEntry::new(
            account,
            EntryType::Credit,
            dec!(250),
            EntrySource::CashLoanPayment,
            date,
        );
        let debit = NewEntry::new(
            account,
            EntryType::Debit,
            dec!(250),
            EntrySource::PaymentComission,
            date,
        );

        assert_eq!(credit.balance_delta(), dec!(250));
        assert_eq!(debit.balance_delta(), dec!(-250));
    }
}
