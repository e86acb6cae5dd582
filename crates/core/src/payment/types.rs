//! Payment domain types.

use prestia_shared::types::money::PENDING_EPSILON;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::EntrySource;

/// How a payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Collected in cash by the field agent.
    Cash,
    /// Received directly on the bank account.
    MoneyTransfer,
}

impl PaymentMethod {
    /// The income entry source implied by this method.
    #[must_use]
    pub fn entry_source(self) -> EntrySource {
        match self {
            Self::Cash => EntrySource::CashLoanPayment,
            Self::MoneyTransfer => EntrySource::BankLoanPayment,
        }
    }
}

/// Completion status of a collection batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// The agent collected at least the expected amount.
    Complete,
    /// The agent collected less than expected.
    Partial,
}

impl BatchStatus {
    /// Derives the status from the expected and actually-paid amounts.
    #[must_use]
    pub fn from_amounts(expected: Decimal, paid: Decimal) -> Self {
        if expected - paid <= PENDING_EPSILON {
            Self::Complete
        } else {
            Self::Partial
        }
    }
}

/// The balance-relevant fields of one payment in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLine {
    /// The collected amount.
    pub amount: Decimal,
    /// The collector's commission for this payment.
    pub comission: Decimal,
    /// How the payment was received.
    pub method: PaymentMethod,
}

/// Accumulated balance changes for the two accounts a batch touches.
///
/// Batch operations accumulate their whole effect here and apply it to each
/// account exactly once, instead of writing balances per line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountDeltas {
    /// Net change to the route's cash account.
    pub cash: Decimal,
    /// Net change to the bank account.
    pub bank: Decimal,
}

impl AccountDeltas {
    /// The zero delta.
    pub const ZERO: Self = Self {
        cash: Decimal::ZERO,
        bank: Decimal::ZERO,
    };

    /// Returns true when neither account would change.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.cash.is_zero() && self.bank.is_zero()
    }
}

impl std::ops::Add for AccountDeltas {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cash: self.cash + rhs.cash,
            bank: self.bank + rhs.bank,
        }
    }
}

impl std::ops::AddAssign for AccountDeltas {
    fn add_assign(&mut self, rhs: Self) {
        self.cash += rhs.cash;
        self.bank += rhs.bank;
    }
}

impl std::ops::Sub for AccountDeltas {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            cash: self.cash - rhs.cash,
            bank: self.bank - rhs.bank,
        }
    }
}

impl std::ops::Neg for AccountDeltas {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            cash: -self.cash,
            bank: -self.bank,
        }
    }
}
