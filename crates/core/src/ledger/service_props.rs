//! Property-based tests for ledger planning.
//!
//! - Transfer conservation: a paired transfer never changes the combined
//!   balance across the two accounts.
//! - Reversal round trip: an entry plus its reversal nets to zero.
//! - Repair convergence: one adjustment makes any drifted account
//!   consistent, and a second pass is a no-op.

use chrono::NaiveDate;
use prestia_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::{EntrySource, EntryType};
use super::reconcile::Reconciliation;
use super::service::{LedgerService, ReversalSource};

fn entry_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate signed balances (-10,000.00 to 10,000.00).
fn balance() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate entry types.
fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A planned transfer's two deltas always cancel exactly.
    #[test]
    fn prop_transfer_conserves_total_balance(amount in positive_amount()) {
        let plan = LedgerService::plan_transfer(
            AccountId::new(),
            AccountId::new(),
            amount,
            entry_date(),
        )
        .unwrap();

        prop_assert_eq!(plan.net_effect(), Decimal::ZERO);
        prop_assert_eq!(plan.outgoing.amount, plan.incoming.amount);
    }

    /// An entry followed by its reversal restores the balance exactly.
    #[test]
    fn prop_reversal_nets_to_zero(
        amount in positive_amount(),
        entry_type in entry_type_strategy(),
    ) {
        let original = ReversalSource {
            account_id: AccountId::new(),
            entry_type,
            amount,
            source: EntrySource::CashLoanPayment,
            description: None,
        };

        let reversal = LedgerService::reversing_entry(&original, entry_date());

        prop_assert_eq!(
            entry_type.signed(amount) + reversal.balance_delta(),
            Decimal::ZERO
        );
    }

    /// One adjustment repairs any drift; a second pass finds nothing to do.
    #[test]
    fn prop_fix_converges_in_one_step(
        stored in balance(),
        calculated in balance(),
    ) {
        let account_id = AccountId::new();
        let rec = Reconciliation::new(account_id, stored, calculated);

        let repaired_calculated = match rec.adjustment(entry_date(), None) {
            Some(entry) => rec.calculated_balance + entry.balance_delta(),
            None => rec.calculated_balance,
        };

        let second = Reconciliation::new(account_id, stored, repaired_calculated);
        prop_assert!(second.is_consistent);
        prop_assert!(second.adjustment(entry_date(), None).is_none());
    }

    /// Net effect over a shuffled entry log is order-independent.
    #[test]
    fn prop_net_effect_is_order_independent(
        amounts in prop::collection::vec((entry_type_strategy(), positive_amount()), 1..20),
    ) {
        let forward = LedgerService::net_effect(amounts.clone());
        let mut reversed = amounts;
        reversed.reverse();
        let backward = LedgerService::net_effect(reversed);

        prop_assert_eq!(forward, backward);
    }
}
