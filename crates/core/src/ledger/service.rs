//! Ledger service for entry validation and planning.
//!
//! This service contains pure business logic with no database dependencies.
//! It validates amounts and plans entries (including paired transfers and
//! reversals) before the repositories persist them.

use chrono::NaiveDate;
use prestia_shared::types::AccountId;
use rust_decimal::Decimal;

use super::entry::{EntrySource, EntryType, NewEntry};
use super::error::LedgerError;

/// The facts about a persisted entry a reversal needs.
#[derive(Debug, Clone)]
pub struct ReversalSource {
    /// The account the original entry posted to.
    pub account_id: AccountId,
    /// The original entry type.
    pub entry_type: EntryType,
    /// The original magnitude.
    pub amount: Decimal,
    /// The original source.
    pub source: EntrySource,
    /// The original description, if any.
    pub description: Option<String>,
}

/// A planned paired transfer: two entries whose deltas cancel.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    /// DEBIT/TRANSFER_OUT on the source account.
    pub outgoing: NewEntry,
    /// CREDIT/TRANSFER_IN on the destination account.
    pub incoming: NewEntry,
}

impl TransferPlan {
    /// Returns the combined balance effect across both accounts.
    ///
    /// Always zero: money moves, it is never created.
    #[must_use]
    pub fn net_effect(&self) -> Decimal {
        self.outgoing.balance_delta() + self.incoming.balance_delta()
    }
}

/// Stateless ledger planning.
pub struct LedgerService;

impl LedgerService {
    /// Validates and plans a single entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] when the amount is zero or
    /// negative.
    pub fn new_entry(
        account_id: AccountId,
        entry_type: EntryType,
        amount: Decimal,
        source: EntrySource,
        entry_date: NaiveDate,
    ) -> Result<NewEntry, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        Ok(NewEntry::new(account_id, entry_type, amount, source, entry_date))
    }

    /// Plans a paired transfer between two accounts.
    ///
    /// Produces exactly two entries, DEBIT/TRANSFER_OUT on the source and
    /// CREDIT/TRANSFER_IN on the destination, so the combined balance across
    /// the two accounts is conserved by construction.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount or identical accounts.
    pub fn plan_transfer(
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: Decimal,
        entry_date: NaiveDate,
    ) -> Result<TransferPlan, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if source_account_id == destination_account_id {
            return Err(LedgerError::SameAccountTransfer(source_account_id));
        }

        let outgoing = NewEntry::new(
            source_account_id,
            EntryType::Debit,
            amount,
            EntrySource::TransferOut,
            entry_date,
        )
        .with_destination(destination_account_id);

        let incoming = NewEntry::new(
            destination_account_id,
            EntryType::Credit,
            amount,
            EntrySource::TransferIn,
            entry_date,
        )
        .with_destination(source_account_id);

        Ok(TransferPlan { outgoing, incoming })
    }

    /// Plans the reversal of a persisted entry.
    ///
    /// The reversal is additive: a new entry of the opposite type and equal
    /// amount whose net effect restores the balance to its pre-entry value.
    /// The original entry is retained for audit.
    #[must_use]
    pub fn reversing_entry(original: &ReversalSource, entry_date: NaiveDate) -> NewEntry {
        NewEntry::new(
            original.account_id,
            original.entry_type.opposite(),
            original.amount,
            original.source,
            entry_date,
        )
        .with_description(format!(
            "Reversal: {}",
            original.description.clone().unwrap_or_default()
        ))
    }

    /// Sums the signed balance effect of a set of persisted entries.
    ///
    /// Used by the cancellation flows that physically remove entries and
    /// must revert their net effect on the owning account in the same step.
    #[must_use]
    pub fn net_effect<I>(entries: I) -> Decimal
    where
        I: IntoIterator<Item = (EntryType, Decimal)>,
    {
        entries
            .into_iter()
            .map(|(entry_type, amount)| entry_type.signed(amount))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_new_entry_valid() {
        let entry = LedgerService::new_entry(
            AccountId::new(),
            EntryType::Credit,
            dec!(100),
            EntrySource::CashLoanPayment,
            date(),
        )
        .unwrap();

        assert_eq!(entry.amount, dec!(100));
        assert_eq!(entry.balance_delta(), dec!(100));
    }

    #[test]
    fn test_new_entry_rejects_zero_amount() {
        let result = LedgerService::new_entry(
            AccountId::new(),
            EntryType::Credit,
            Decimal::ZERO,
            EntrySource::CashLoanPayment,
            date(),
        );

        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn test_new_entry_rejects_negative_amount() {
        let result = LedgerService::new_entry(
            AccountId::new(),
            EntryType::Debit,
            dec!(-50),
            EntrySource::PaymentComission,
            date(),
        );

        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn test_plan_transfer_shape() {
        let source = AccountId::new();
        let destination = AccountId::new();

        let plan = LedgerService::plan_transfer(source, destination, dec!(500), date()).unwrap();

        assert_eq!(plan.outgoing.account_id, source);
        assert_eq!(plan.outgoing.entry_type, EntryType::Debit);
        assert_eq!(plan.outgoing.source, EntrySource::TransferOut);
        assert_eq!(plan.outgoing.destination_account_id, Some(destination));

        assert_eq!(plan.incoming.account_id, destination);
        assert_eq!(plan.incoming.entry_type, EntryType::Credit);
        assert_eq!(plan.incoming.source, EntrySource::TransferIn);
        assert_eq!(plan.incoming.destination_account_id, Some(source));

        assert_eq!(plan.net_effect(), Decimal::ZERO);
    }

    #[test]
    fn test_plan_transfer_rejects_same_account() {
        let account = AccountId::new();
        let result = LedgerService::plan_transfer(account, account, dec!(500), date());

        assert!(matches!(result, Err(LedgerError::SameAccountTransfer(_))));
    }

    #[test]
    fn test_reversing_entry_swaps_type_and_keeps_amount() {
        let original = ReversalSource {
            account_id: AccountId::new(),
            entry_type: EntryType::Credit,
            amount: dec!(300),
            source: EntrySource::CashLoanPayment,
            description: Some("weekly collection".to_string()),
        };

        let reversal = LedgerService::reversing_entry(&original, date());

        assert_eq!(reversal.entry_type, EntryType::Debit);
        assert_eq!(reversal.amount, dec!(300));
        assert_eq!(reversal.source, EntrySource::CashLoanPayment);
        assert_eq!(
            reversal.description.as_deref(),
            Some("Reversal: weekly collection")
        );
        assert_eq!(
            reversal.balance_delta() + original.entry_type.signed(original.amount),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_net_effect_sums_signed_amounts() {
        let net = LedgerService::net_effect(vec![
            (EntryType::Credit, dec!(300)),
            (EntryType::Debit, dec!(20)),
            (EntryType::Credit, dec!(150)),
        ]);

        assert_eq!(net, dec!(430));
    }
}
