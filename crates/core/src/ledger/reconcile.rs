//! Balance reconciliation and repair arithmetic.
//!
//! The materialized balance on an account is a cache over its entry log. This
//! module compares the two and derives the single adjustment entry that
//! closes any gap.

use chrono::NaiveDate;
use prestia_shared::types::money::BALANCE_EPSILON;
use prestia_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntrySource, EntryType, NewEntry};

/// Result of comparing an account's materialized balance to its entry log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    /// The account under inspection.
    pub account_id: AccountId,
    /// The materialized balance stored on the account row.
    pub stored_balance: Decimal,
    /// The balance recomputed from entries: Σ CREDIT − Σ DEBIT.
    pub calculated_balance: Decimal,
    /// `stored − calculated`.
    pub difference: Decimal,
    /// Whether the two figures agree within the balance epsilon.
    pub is_consistent: bool,
}

impl Reconciliation {
    /// Builds a reconciliation from the stored and recomputed balances.
    #[must_use]
    pub fn new(account_id: AccountId, stored_balance: Decimal, calculated_balance: Decimal) -> Self {
        let difference = stored_balance - calculated_balance;
        Self {
            account_id,
            stored_balance,
            calculated_balance,
            difference,
            is_consistent: difference.abs() < BALANCE_EPSILON,
        }
    }

    /// Recomputes the calculated balance from an entry log.
    #[must_use]
    pub fn calculated_from<I>(entries: I) -> Decimal
    where
        I: IntoIterator<Item = (EntryType, Decimal)>,
    {
        entries
            .into_iter()
            .map(|(entry_type, amount)| entry_type.signed(amount))
            .sum()
    }

    /// Derives the repair entry that makes the calculated balance equal the
    /// stored one, or `None` when the account is already consistent.
    ///
    /// The direction falls out of `calculated + delta == stored`, so
    /// `delta == difference`: a positive difference (stored > calculated)
    /// needs a CREDIT of `|difference|`, a negative one needs a DEBIT. The
    /// stored figure is treated as ground truth during repair; the adjustment
    /// always moves calculated toward stored, never the reverse.
    #[must_use]
    pub fn adjustment(&self, entry_date: NaiveDate, description: Option<String>) -> Option<NewEntry> {
        if self.is_consistent {
            return None;
        }

        let entry_type = if self.difference > Decimal::ZERO {
            EntryType::Credit
        } else {
            EntryType::Debit
        };

        let mut entry = NewEntry::new(
            self.account_id,
            entry_type,
            self.difference.abs(),
            EntrySource::BalanceAdjustment,
            entry_date,
        );
        if let Some(description) = description {
            entry = entry.with_description(description);
        }

        Some(entry)
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
    fn test_consistent_within_epsilon() {
        let rec = Reconciliation::new(AccountId::new(), dec!(100.005), dec!(100.00));
        assert!(rec.is_consistent);
        assert!(rec.adjustment(date(), None).is_none());
    }

    #[test]
    fn test_calculated_from_entries() {
        let calculated = Reconciliation::calculated_from(vec![
            (EntryType::Credit, dec!(500)),
            (EntryType::Debit, dec!(120)),
            (EntryType::Credit, dec!(30)),
        ]);
        assert_eq!(calculated, dec!(410));
    }

    // The adjustment direction is derived from first principles: the repair
    // entry must make the calculated balance equal the stored one.

    #[test]
    fn test_adjustment_direction_stored_above_calculated_is_credit() {
        let rec = Reconciliation::new(AccountId::new(), dec!(150), dec!(100));
        let entry = rec.adjustment(date(), None).unwrap();

        assert_eq!(entry.entry_type, EntryType::Credit);
        assert_eq!(entry.amount, dec!(50));
        assert_eq!(entry.source, EntrySource::BalanceAdjustment);

        // The repaired log now sums to the stored balance.
        assert_eq!(rec.calculated_balance + entry.balance_delta(), rec.stored_balance);
    }

    #[test]
    fn test_adjustment_direction_stored_below_calculated_is_debit() {
        let rec = Reconciliation::new(AccountId::new(), dec!(100), dec!(150));
        let entry = rec.adjustment(date(), None).unwrap();

        assert_eq!(entry.entry_type, EntryType::Debit);
        assert_eq!(entry.amount, dec!(50));
        assert_eq!(rec.calculated_balance + entry.balance_delta(), rec.stored_balance);
    }

    #[test]
    fn test_adjustment_is_idempotent() {
        let account_id = AccountId::new();
        let rec = Reconciliation::new(account_id, dec!(150), dec!(100));
        let entry = rec.adjustment(date(), None).unwrap();

        let repaired = Reconciliation::new(
            account_id,
            rec.stored_balance,
            rec.calculated_balance + entry.balance_delta(),
        );

        assert!(repaired.is_consistent);
        assert!(repaired.adjustment(date(), None).is_none());
    }
}
