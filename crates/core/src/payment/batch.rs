//! Batch cash/bank netting.
//!
//! A batch edit must compute a NET balance change without double-counting:
//! a payment that is both edited and covered by the batch-level transfer
//! adjustment must be counted exactly once. The netting here is an explicit
//! before/after snapshot comparison: every line of the edit request is
//! tagged with what happened to it, the old and new effects are computed
//! from those images with the same function, and the net change is their
//! difference.

use rust_decimal::Decimal;

use super::types::{AccountDeltas, PaymentLine, PaymentMethod};

/// The batch-level amounts that move money besides the payments themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchTotals {
    /// Cash collections the agent physically moved to the bank.
    pub bank_paid_amount: Decimal,
    /// Shortage the agent reported for the run.
    pub falco_amount: Decimal,
}

/// The cash/bank contribution of a single payment.
///
/// The collected amount lands on the account implied by the payment method;
/// the commission is ALWAYS debited from cash, regardless of the line's own
/// method, because commissions are paid out in cash by convention.
#[must_use]
pub fn line_effect(line: &PaymentLine) -> AccountDeltas {
    let mut deltas = AccountDeltas::ZERO;
    match line.method {
        PaymentMethod::Cash => deltas.cash += line.amount,
        PaymentMethod::MoneyTransfer => deltas.bank += line.amount,
    }
    deltas.cash -= line.comission;
    deltas
}

/// The full cash/bank contribution of a batch state.
///
/// Sums the line effects, folds in the cash→bank transfer, and subtracts the
/// reported shortage from cash.
#[must_use]
pub fn batch_effect<'a, I>(lines: I, totals: &BatchTotals) -> AccountDeltas
where
    I: IntoIterator<Item = &'a PaymentLine>,
{
    let mut deltas = lines
        .into_iter()
        .fold(AccountDeltas::ZERO, |acc, line| acc + line_effect(line));

    deltas.cash -= totals.bank_paid_amount;
    deltas.bank += totals.bank_paid_amount;
    deltas.cash -= totals.falco_amount;

    deltas
}

/// What happened to one line of a batch edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineChange {
    /// The payment appears in the request but is not modified.
    Unchanged(PaymentLine),
    /// The payment's amount, commission, or method changed.
    Edited {
        /// The pre-edit stored values.
        before: PaymentLine,
        /// The requested values.
        after: PaymentLine,
    },
    /// The payment is removed; its rows and entries are deleted.
    Deleted(PaymentLine),
    /// A new payment joins the batch.
    Added(PaymentLine),
}

impl LineChange {
    /// The pre-edit image, if the payment existed before.
    #[must_use]
    pub fn before(&self) -> Option<&PaymentLine> {
        match self {
            Self::Unchanged(line) | Self::Deleted(line) => Some(line),
            Self::Edited { before, .. } => Some(before),
            Self::Added(_) => None,
        }
    }

    /// The post-edit image, if the payment survives.
    #[must_use]
    pub fn after(&self) -> Option<&PaymentLine> {
        match self {
            Self::Unchanged(line) | Self::Added(line) => Some(line),
            Self::Edited { after, .. } => Some(after),
            Self::Deleted(_) => None,
        }
    }
}

/// A batch edit as a before/after snapshot comparison.
#[derive(Debug, Clone)]
pub struct BatchDiff {
    /// One tag per line of the edit request.
    pub changes: Vec<LineChange>,
    /// The batch-level totals before the edit.
    pub before_totals: BatchTotals,
    /// The batch-level totals requested by the edit.
    pub after_totals: BatchTotals,
}

impl BatchDiff {
    /// The cash/bank contribution of everything in the request, pre-edit.
    #[must_use]
    pub fn old_effect(&self) -> AccountDeltas {
        batch_effect(
            self.changes.iter().filter_map(LineChange::before),
            &self.before_totals,
        )
    }

    /// The cash/bank contribution of everything in the request, post-edit.
    #[must_use]
    pub fn new_effect(&self) -> AccountDeltas {
        batch_effect(
            self.changes.iter().filter_map(LineChange::after),
            &self.after_totals,
        )
    }

    /// The net balance change the edit must apply to each account, exactly
    /// once.
    #[must_use]
    pub fn net_change(&self) -> AccountDeltas {
        self.new_effect() - self.old_effect()
    }

    /// The lines that survive the edit.
    pub fn surviving_lines(&self) -> impl Iterator<Item = &PaymentLine> {
        self.changes.iter().filter_map(LineChange::after)
    }

    /// Total amount paid across surviving lines.
    #[must_use]
    pub fn surviving_paid_amount(&self) -> Decimal {
        self.surviving_lines().map(|line| line.amount).sum()
    }

    /// True when the edit leaves the batch without payments.
    #[must_use]
    pub fn empties_batch(&self) -> bool {
        self.surviving_lines().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cash(amount: Decimal, comission: Decimal) -> PaymentLine {
        PaymentLine {
            amount,
            comission,
            method: PaymentMethod::Cash,
        }
    }

    fn transfer(amount: Decimal, comission: Decimal) -> PaymentLine {
        PaymentLine {
            amount,
            comission,
            method: PaymentMethod::MoneyTransfer,
        }
    }

    #[test]
    fn test_line_effect_cash() {
        let deltas = line_effect(&cash(dec!(300), dec!(20)));
        assert_eq!(deltas.cash, dec!(280));
        assert_eq!(deltas.bank, Decimal::ZERO);
    }

    #[test]
    fn test_line_effect_transfer_commission_still_cash() {
        let deltas = line_effect(&transfer(dec!(300), dec!(20)));
        assert_eq!(deltas.cash, dec!(-20));
        assert_eq!(deltas.bank, dec!(300));
    }

    #[test]
    fn test_batch_effect_folds_transfer_and_falco() {
        let lines = vec![cash(dec!(300), dec!(20)), cash(dec!(200), Decimal::ZERO)];
        let totals = BatchTotals {
            bank_paid_amount: dec!(400),
            falco_amount: dec!(50),
        };

        let deltas = batch_effect(&lines, &totals);

        // 300 + 200 - 20 commissions - 400 moved to bank - 50 shortage
        assert_eq!(deltas.cash, dec!(30));
        assert_eq!(deltas.bank, dec!(400));
    }

    #[test]
    fn test_unchanged_lines_contribute_nothing_to_net_change() {
        let diff = BatchDiff {
            changes: vec![
                LineChange::Unchanged(cash(dec!(300), dec!(20))),
                LineChange::Unchanged(transfer(dec!(150), Decimal::ZERO)),
            ],
            before_totals: BatchTotals {
                bank_paid_amount: dec!(100),
                falco_amount: Decimal::ZERO,
            },
            after_totals: BatchTotals {
                bank_paid_amount: dec!(100),
                falco_amount: Decimal::ZERO,
            },
        };

        assert_eq!(diff.net_change(), AccountDeltas::ZERO);
    }

    #[test]
    fn test_edited_line_nets_only_the_difference() {
        let diff = BatchDiff {
            changes: vec![LineChange::Edited {
                before: cash(dec!(300), dec!(20)),
                after: cash(dec!(350), dec!(20)),
            }],
            before_totals: BatchTotals::default(),
            after_totals: BatchTotals::default(),
        };

        let net = diff.net_change();
        assert_eq!(net.cash, dec!(50));
        assert_eq!(net.bank, Decimal::ZERO);
    }

    #[test]
    fn test_edit_and_transfer_change_count_once() {
        // A payment is edited AND the batch-level bank transfer grows; the
        // two adjustments must not double-count the payment.
        let diff = BatchDiff {
            changes: vec![LineChange::Edited {
                before: cash(dec!(300), Decimal::ZERO),
                after: cash(dec!(500), Decimal::ZERO),
            }],
            before_totals: BatchTotals {
                bank_paid_amount: dec!(300),
                falco_amount: Decimal::ZERO,
            },
            after_totals: BatchTotals {
                bank_paid_amount: dec!(500),
                falco_amount: Decimal::ZERO,
            },
        };

        let net = diff.net_change();
        // Cash: +200 from the bigger payment, -200 from the bigger transfer.
        assert_eq!(net.cash, Decimal::ZERO);
        assert_eq!(net.bank, dec!(200));
    }

    #[test]
    fn test_method_change_moves_between_accounts() {
        let diff = BatchDiff {
            changes: vec![LineChange::Edited {
                before: cash(dec!(300), dec!(20)),
                after: transfer(dec!(300), dec!(20)),
            }],
            before_totals: BatchTotals::default(),
            after_totals: BatchTotals::default(),
        };

        let net = diff.net_change();
        assert_eq!(net.cash, dec!(-300));
        assert_eq!(net.bank, dec!(300));
    }

    #[test]
    fn test_delete_all_reverts_creation_effect() {
        let lines = vec![cash(dec!(300), dec!(20)), transfer(dec!(150), dec!(10))];
        let totals = BatchTotals {
            bank_paid_amount: dec!(100),
            falco_amount: dec!(30),
        };

        let creation = batch_effect(&lines, &totals);
        let diff = BatchDiff {
            changes: lines.into_iter().map(LineChange::Deleted).collect(),
            before_totals: totals,
            after_totals: BatchTotals::default(),
        };

        assert!(diff.empties_batch());
        assert_eq!(diff.net_change(), -creation);
    }

    #[test]
    fn test_added_line_is_pure_new_effect() {
        let diff = BatchDiff {
            changes: vec![LineChange::Added(cash(dec!(250), dec!(10)))],
            before_totals: BatchTotals::default(),
            after_totals: BatchTotals::default(),
        };

        let net = diff.net_change();
        assert_eq!(net.cash, dec!(240));
        assert_eq!(net.bank, Decimal::ZERO);
    }

    #[test]
    fn test_surviving_paid_amount_skips_deleted() {
        let diff = BatchDiff {
            changes: vec![
                LineChange::Unchanged(cash(dec!(300), Decimal::ZERO)),
                LineChange::Deleted(cash(dec!(200), Decimal::ZERO)),
                LineChange::Added(cash(dec!(100), Decimal::ZERO)),
            ],
            before_totals: BatchTotals::default(),
            after_totals: BatchTotals::default(),
        };

        assert_eq!(diff.surviving_paid_amount(), dec!(400));
        assert!(!diff.empties_batch());
    }
}
