//! Property-based tests for batch netting.
//!
//! The conservation property: for any sequence of edits to a batch that ends
//! with every payment deleted and all batch-level totals reset to zero, the
//! accumulated net changes cancel the creation effect EXACTLY, not just
//! within an epsilon.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::batch::{batch_effect, BatchDiff, BatchTotals, LineChange};
use super::types::{AccountDeltas, PaymentLine, PaymentMethod};

/// Strategy to generate payment amounts (0.01 to 5,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate commissions (0.00 to 100.00).
fn comission() -> impl Strategy<Value = Decimal> {
    (0i64..10_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate payment methods.
fn method() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![Just(PaymentMethod::Cash), Just(PaymentMethod::MoneyTransfer)]
}

/// Strategy to generate a payment line.
fn line() -> impl Strategy<Value = PaymentLine> {
    (amount(), comission(), method()).prop_map(|(amount, comission, method)| PaymentLine {
        amount,
        comission,
        method,
    })
}

/// Strategy to generate batch totals.
fn totals() -> impl Strategy<Value = BatchTotals> {
    (comission(), comission()).prop_map(|(bank_paid_amount, falco_amount)| BatchTotals {
        bank_paid_amount,
        falco_amount,
    })
}

/// A batch state: its lines and batch-level totals.
type State = (Vec<PaymentLine>, BatchTotals);

/// Builds a full-state diff between two batch states, pairing lines by index.
fn diff_between(before: &State, after: &State) -> BatchDiff {
    let (before_lines, before_totals) = before;
    let (after_lines, after_totals) = after;

    let mut changes = Vec::new();
    let shared = before_lines.len().min(after_lines.len());

    for i in 0..shared {
        if before_lines[i] == after_lines[i] {
            changes.push(LineChange::Unchanged(before_lines[i].clone()));
        } else {
            changes.push(LineChange::Edited {
                before: before_lines[i].clone(),
                after: after_lines[i].clone(),
            });
        }
    }
    for line in &before_lines[shared..] {
        changes.push(LineChange::Deleted(line.clone()));
    }
    for line in &after_lines[shared..] {
        changes.push(LineChange::Added(line.clone()));
    }

    BatchDiff {
        changes,
        before_totals: *before_totals,
        after_totals: *after_totals,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A create → edit* → delete-everything sequence nets to exactly zero on
    /// both accounts.
    #[test]
    fn prop_full_lifecycle_conserves_balances(
        initial_lines in prop::collection::vec(line(), 1..8),
        initial_totals in totals(),
        intermediate in prop::collection::vec(
            (prop::collection::vec(line(), 0..8), totals()),
            0..5,
        ),
    ) {
        let initial: State = (initial_lines, initial_totals);
        let terminal: State = (Vec::new(), BatchTotals::default());

        // Creation applies the full batch effect; every subsequent edit
        // applies only its net change; the last edit deletes everything.
        let mut running = batch_effect(&initial.0, &initial.1);

        let mut previous = initial;
        for state in intermediate.into_iter().chain(std::iter::once(terminal)) {
            running += diff_between(&previous, &state).net_change();
            previous = state;
        }

        prop_assert_eq!(running, AccountDeltas::ZERO);
    }

    /// A diff's net change always equals the direct state-effect difference;
    /// the tagged representation introduces no drift.
    #[test]
    fn prop_net_change_matches_state_difference(
        before_lines in prop::collection::vec(line(), 0..8),
        before_totals in totals(),
        after_lines in prop::collection::vec(line(), 0..8),
        after_totals in totals(),
    ) {
        let before: State = (before_lines, before_totals);
        let after: State = (after_lines, after_totals);

        let diff = diff_between(&before, &after);

        prop_assert_eq!(
            diff.net_change(),
            batch_effect(&after.0, &after.1) - batch_effect(&before.0, &before.1)
        );
    }

    /// An identity edit (same lines, same totals) changes nothing.
    #[test]
    fn prop_identity_edit_is_zero(
        lines in prop::collection::vec(line(), 0..8),
        batch_totals in totals(),
    ) {
        let state: State = (lines, batch_totals);
        let diff = diff_between(&state, &state);

        prop_assert_eq!(diff.net_change(), AccountDeltas::ZERO);
        prop_assert!(diff
            .changes
            .iter()
            .all(|c| matches!(c, LineChange::Unchanged(_))));
    }

    /// Payments outside the edit request never influence the net change:
    /// adding unchanged lines to a diff leaves its net change untouched.
    #[test]
    fn prop_unchanged_lines_never_double_count(
        changed_before in line(),
        changed_after in line(),
        untouched in prop::collection::vec(line(), 0..6),
        batch_totals in totals(),
    ) {
        let minimal = BatchDiff {
            changes: vec![LineChange::Edited {
                before: changed_before.clone(),
                after: changed_after.clone(),
            }],
            before_totals: batch_totals,
            after_totals: batch_totals,
        };

        let mut padded_changes: Vec<LineChange> =
            untouched.into_iter().map(LineChange::Unchanged).collect();
        padded_changes.push(LineChange::Edited {
            before: changed_before,
            after: changed_after,
        });
        let padded = BatchDiff {
            changes: padded_changes,
            before_totals: batch_totals,
            after_totals: batch_totals,
        };

        prop_assert_eq!(minimal.net_change(), padded.net_change());
    }
}
