//! Payment repository: single payments, agent collection batches, and
//! shortage compensations.
//!
//! Every public operation is one logical action inside one database
//! transaction. Single-payment paths write balances entry by entry; batch
//! paths insert entry rows only, accumulate their whole cash/bank effect in
//! an [`AccountDeltas`] value, and apply it to each account exactly once.

use chrono::NaiveDate;
use prestia_core::ledger::{EntrySource, EntryType, LedgerService, NewEntry};
use prestia_core::loan::{LoanEngine, PaymentSplit, PaymentSplitInput};
use prestia_core::payment::{
    batch_effect, falco, AccountDeltas, BatchDiff, BatchStatus, BatchTotals, LineChange,
    PaymentLine, PaymentMethod,
};
use prestia_shared::types::money::PENDING_EPSILON;
use prestia_shared::types::{AccountId, LeadPaymentId, LoanId, PaymentId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{self, LoanStatus};
use crate::entities::{account_entries, falco_compensations, lead_payments_received, loans, payments};
use crate::repositories::account::{AccountError, AccountRepository, RouteAccounts};
use crate::repositories::balance::{BalanceError, BalanceRepository};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Batch not found.
    #[error("Batch not found: {0}")]
    BatchNotFound(Uuid),

    /// A payment rule rejected the input.
    #[error(transparent)]
    Rule(#[from] prestia_core::payment::PaymentError),

    /// Ledger operation failed.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Account resolution failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a single payment on a loan.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// The loan being paid.
    pub loan_id: Uuid,
    /// The collected amount.
    pub amount: Decimal,
    /// Collector commission; defaults to the loan's configured rate.
    pub comission: Option<Decimal>,
    /// How the payment was received.
    pub method: PaymentMethod,
    /// The calendar day the payment was received.
    pub received_at: NaiveDate,
}

/// One line of a batch recording request.
#[derive(Debug, Clone)]
pub struct BatchLineInput {
    /// The loan being paid.
    pub loan_id: Uuid,
    /// The collected amount.
    pub amount: Decimal,
    /// Collector commission; defaults to the loan's configured rate.
    pub comission: Option<Decimal>,
    /// How the payment was received.
    pub method: PaymentMethod,
}

/// Input for recording a field agent's collection batch.
#[derive(Debug, Clone)]
pub struct RecordBatchInput {
    /// The lead the collections belong to.
    pub lead_id: Uuid,
    /// The collecting agent.
    pub agent_id: Uuid,
    /// What the agent was expected to collect.
    pub expected_amount: Decimal,
    /// The collection date.
    pub received_at: NaiveDate,
    /// One line per collected payment.
    pub lines: Vec<BatchLineInput>,
    /// Cash collections the agent physically moved to the bank.
    pub bank_paid_amount: Decimal,
    /// Shortage the agent reported.
    pub falco_amount: Decimal,
}

/// One line of a batch edit request.
#[derive(Debug, Clone)]
pub struct EditBatchLine {
    /// The existing payment to touch; `None` adds a new one.
    pub payment_id: Option<Uuid>,
    /// The loan the payment belongs to (used for added lines).
    pub loan_id: Uuid,
    /// The desired amount.
    pub amount: Decimal,
    /// The desired commission; `None` keeps the stored one (or the loan's
    /// configured rate for added lines).
    pub comission: Option<Decimal>,
    /// The desired payment method.
    pub method: PaymentMethod,
    /// True to remove the payment entirely.
    pub delete: bool,
}

/// Input for editing a previously recorded batch.
#[derive(Debug, Clone)]
pub struct EditBatchInput {
    /// New expected amount; `None` keeps the stored one.
    pub expected_amount: Option<Decimal>,
    /// The new cash→bank transfer total.
    pub bank_paid_amount: Decimal,
    /// The desired state of every touched payment.
    pub lines: Vec<EditBatchLine>,
}

/// Payment repository for collection orchestration.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Single payment
    // ========================================================================

    /// Records a single payment in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing or any step fails; nothing is
    /// persisted in that case.
    pub async fn record_payment(
        &self,
        input: RecordPaymentInput,
    ) -> Result<payments::Model, PaymentError> {
        let txn = self.db.begin().await?;
        let payment = Self::record_payment_in_txn(&txn, input).await?;
        txn.commit().await?;
        Ok(payment)
    }

    /// Records a single payment inside the caller's transaction.
    ///
    /// Creates the payment row, a CREDIT income entry on the account implied
    /// by the payment method (tagged with the recomputed profit/capital
    /// split), a DEBIT commission entry on the same account when the
    /// commission is positive, and updates the loan's totals, all as one
    /// unit. The account's materialized balance moves by the net
    /// (collected − commission).
    ///
    /// # Errors
    ///
    /// Returns an error if the loan or its route accounts are missing.
    pub async fn record_payment_in_txn<C: ConnectionTrait>(
        conn: &C,
        input: RecordPaymentInput,
    ) -> Result<payments::Model, PaymentError> {
        let loan = find_loan(conn, input.loan_id).await?;
        let comission = input.comission.unwrap_or(loan.payment_comission);
        let split = split_for(&loan, input.amount);

        let payment = insert_payment_row(
            conn,
            input.loan_id,
            None,
            input.amount,
            comission,
            input.method,
            input.received_at,
        )
        .await?;

        let accounts = AccountRepository::route_accounts(conn, loan.route_id).await?;
        let target = match input.method {
            PaymentMethod::Cash => &accounts.cash,
            PaymentMethod::MoneyTransfer => &accounts.bank,
        };

        let income = income_entry(target.id, &payment, input.method, &split, input.received_at)?;
        BalanceRepository::create_entry(conn, income).await?;

        if comission > Decimal::ZERO {
            let entry = comission_entry(target.id, &payment, comission, input.received_at)?;
            BalanceRepository::create_entry(conn, entry).await?;
        }

        adjust_loan_totals(conn, loan, input.amount, comission).await?;

        Ok(payment)
    }

    /// Deletes a single payment in its own transaction.
    ///
    /// Reverts the loan's totals, physically removes the payment's entries
    /// with their balance effect, and removes the payment row. When it was
    /// the batch's last payment, the batch and its transfer/falco entries go
    /// with it; otherwise the batch totals are recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is missing.
    pub async fn delete_payment(&self, payment_id: Uuid) -> Result<(), PaymentError> {
        let txn = self.db.begin().await?;
        Self::delete_payment_in_txn(&txn, payment_id).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Deletes a single payment inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is missing.
    pub async fn delete_payment_in_txn<C: ConnectionTrait>(
        conn: &C,
        payment_id: Uuid,
    ) -> Result<(), PaymentError> {
        let payment = payments::Entity::find_by_id(payment_id)
            .one(conn)
            .await?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;

        let loan = find_loan(conn, payment.loan_id).await?;
        adjust_loan_totals(conn, loan, -payment.amount, -payment.comission).await?;

        BalanceRepository::delete_entries_by_payment(conn, payment.id).await?;

        let lead_payment_id = payment.lead_payment_id;
        payments::Entity::delete_by_id(payment.id).exec(conn).await?;

        if let Some(lead_payment_id) = lead_payment_id {
            let remaining = payments::Entity::find()
                .filter(payments::Column::LeadPaymentId.eq(lead_payment_id))
                .count(conn)
                .await?;

            if remaining == 0 {
                Self::remove_emptied_batch(conn, lead_payment_id).await?;
            } else {
                refresh_batch_totals(conn, lead_payment_id, None, None).await?;
            }
        }

        Ok(())
    }

    /// A batch cannot exist with no payments: removes its leftover entries
    /// (transfer pair, falco loss, compensations) with their balance
    /// effects, its compensation rows, and the batch row itself.
    async fn remove_emptied_batch<C: ConnectionTrait>(
        conn: &C,
        lead_payment_id: Uuid,
    ) -> Result<(), PaymentError> {
        BalanceRepository::delete_entries_by_lead(conn, lead_payment_id).await?;

        falco_compensations::Entity::delete_many()
            .filter(falco_compensations::Column::LeadPaymentId.eq(lead_payment_id))
            .exec(conn)
            .await?;

        lead_payments_received::Entity::delete_by_id(lead_payment_id)
            .exec(conn)
            .await?;

        info!(batch = %lead_payment_id, "removed batch after its last payment");
        Ok(())
    }

    // ========================================================================
    // Batch recording
    // ========================================================================

    /// Records a collection batch in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent, a loan, or an account is missing;
    /// nothing is persisted in that case.
    pub async fn record_batch(
        &self,
        input: RecordBatchInput,
    ) -> Result<lead_payments_received::Model, PaymentError> {
        let txn = self.db.begin().await?;
        let batch = Self::record_batch_in_txn(&txn, input).await?;
        txn.commit().await?;
        Ok(batch)
    }

    /// Records a collection batch inside the caller's transaction.
    ///
    /// Per line: recompute the split, create the payment row, create its
    /// income entry against the method-implied account and its commission
    /// entry against cash. Entry rows carry no balance writes here; the
    /// accumulated cash/bank deltas (including the declared bank transfer
    /// and reported shortage) are applied to the two accounts in one shot.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent, a loan, or an account is missing.
    pub async fn record_batch_in_txn<C: ConnectionTrait>(
        conn: &C,
        input: RecordBatchInput,
    ) -> Result<lead_payments_received::Model, PaymentError> {
        let accounts = AccountRepository::agent_accounts(conn, input.agent_id).await?;

        let paid_amount: Decimal = input.lines.iter().map(|line| line.amount).sum();
        let cash_paid_amount: Decimal = input
            .lines
            .iter()
            .filter(|line| line.method == PaymentMethod::Cash)
            .map(|line| line.amount)
            .sum();

        let now = chrono::Utc::now();
        let batch = lead_payments_received::ActiveModel {
            id: Set(Uuid::new_v4()),
            lead_id: Set(input.lead_id),
            agent_id: Set(input.agent_id),
            expected_amount: Set(input.expected_amount),
            paid_amount: Set(paid_amount),
            cash_paid_amount: Set(cash_paid_amount),
            bank_paid_amount: Set(input.bank_paid_amount),
            falco_amount: Set(input.falco_amount),
            payment_status: Set(BatchStatus::from_amounts(input.expected_amount, paid_amount).into()),
            received_at: Set(input.received_at),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let recorded =
                record_batch_line(conn, &accounts, batch.id, line, input.received_at).await?;
            lines.push(recorded);
        }

        let totals = BatchTotals {
            bank_paid_amount: input.bank_paid_amount,
            falco_amount: input.falco_amount,
        };

        if input.bank_paid_amount > Decimal::ZERO {
            BalanceRepository::insert_transfer(
                conn,
                accounts.cash.id,
                accounts.bank.id,
                input.bank_paid_amount,
                input.received_at,
                Some(batch.id),
            )
            .await?;
        }

        if input.falco_amount > Decimal::ZERO {
            let entry = LedgerService::new_entry(
                AccountId::from_uuid(accounts.cash.id),
                EntryType::Debit,
                input.falco_amount,
                EntrySource::FalcoLoss,
                input.received_at,
            )
            .map_err(BalanceError::from)?
            .with_lead_payment(LeadPaymentId::from_uuid(batch.id));
            BalanceRepository::insert_entry(conn, entry).await?;
        }

        let deltas = batch_effect(&lines, &totals);
        apply_deltas(conn, &accounts, deltas).await?;

        Ok(batch)
    }

    // ========================================================================
    // Batch editing
    // ========================================================================

    /// Edits a previously recorded batch in its own transaction.
    ///
    /// Returns the updated batch, or `None` when the edit removed its last
    /// payment and the batch itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch, a payment, a loan, or an account is
    /// missing; nothing is persisted in that case.
    pub async fn edit_batch(
        &self,
        batch_id: Uuid,
        input: EditBatchInput,
    ) -> Result<Option<lead_payments_received::Model>, PaymentError> {
        let txn = self.db.begin().await?;
        let batch = Self::edit_batch_in_txn(&txn, batch_id, input).await?;
        txn.commit().await?;
        Ok(batch)
    }

    /// Edits a batch inside the caller's transaction.
    ///
    /// The edit is netted through an explicit before/after snapshot diff:
    /// every touched payment contributes its pre-edit image to the old
    /// effect and its post-edit image to the new effect, the previous and
    /// requested bank transfer totals are folded into the respective sides,
    /// and the difference is applied to each account exactly once. Payments
    /// the request does not mention keep their stored effect untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch, a payment, a loan, or an account is
    /// missing.
    pub async fn edit_batch_in_txn<C: ConnectionTrait>(
        conn: &C,
        batch_id: Uuid,
        input: EditBatchInput,
    ) -> Result<Option<lead_payments_received::Model>, PaymentError> {
        let batch = lead_payments_received::Entity::find_by_id(batch_id)
            .one(conn)
            .await?
            .ok_or(PaymentError::BatchNotFound(batch_id))?;

        let accounts = AccountRepository::agent_accounts(conn, batch.agent_id).await?;

        let mut changes = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let change = match line.payment_id {
                Some(payment_id) => {
                    apply_existing_line(conn, &accounts, &batch, payment_id, line).await?
                }
                None => {
                    let added = BatchLineInput {
                        loan_id: line.loan_id,
                        amount: line.amount,
                        comission: line.comission,
                        method: line.method,
                    };
                    let recorded =
                        record_batch_line(conn, &accounts, batch.id, &added, batch.received_at)
                            .await?;
                    LineChange::Added(recorded)
                }
            };
            changes.push(change);
        }

        let remaining = payments::Entity::find()
            .filter(payments::Column::LeadPaymentId.eq(batch.id))
            .count(conn)
            .await?;
        let survives = remaining > 0;

        let before_totals = BatchTotals {
            bank_paid_amount: batch.bank_paid_amount,
            falco_amount: batch.falco_amount,
        };
        let after_totals = if survives {
            BatchTotals {
                bank_paid_amount: input.bank_paid_amount,
                falco_amount: batch.falco_amount,
            }
        } else {
            // An emptied batch takes its transfer and shortage with it.
            BatchTotals::default()
        };

        sync_transfer_entries(conn, &accounts, &batch, after_totals.bank_paid_amount).await?;

        let diff = BatchDiff {
            changes,
            before_totals,
            after_totals,
        };
        let mut net = diff.net_change();

        if !survives {
            // Compensation credits are not part of the diff totals; back
            // them out of cash before their entry rows disappear.
            let compensated = compensated_amount(conn, batch.id).await?;
            net.cash -= compensated;

            let falco_entries = BalanceRepository::find_lead_entries_by_source(
                conn,
                batch.id,
                &[
                    sea_orm_active_enums::EntrySource::FalcoLoss,
                    sea_orm_active_enums::EntrySource::FalcoCompensation,
                ],
            )
            .await?;
            BalanceRepository::delete_entry_rows(
                conn,
                falco_entries.into_iter().map(|entry| entry.id).collect(),
            )
            .await?;
        }

        apply_deltas(conn, &accounts, net).await?;

        if survives {
            let updated = refresh_batch_totals(
                conn,
                batch.id,
                input.expected_amount,
                Some(input.bank_paid_amount),
            )
            .await?;
            Ok(Some(updated))
        } else {
            falco_compensations::Entity::delete_many()
                .filter(falco_compensations::Column::LeadPaymentId.eq(batch.id))
                .exec(conn)
                .await?;
            lead_payments_received::Entity::delete_by_id(batch.id)
                .exec(conn)
                .await?;
            info!(batch = %batch.id, "batch edit removed every payment, batch deleted");
            Ok(None)
        }
    }

    // ========================================================================
    // Shortage compensation
    // ========================================================================

    /// Records a compensation against a batch's reported shortage in its
    /// own transaction.
    ///
    /// # Errors
    ///
    /// Returns `Rule(ExceedsRemaining)` when the compensation over-claims
    /// the uncompensated remainder, and `BatchNotFound` for a missing batch.
    pub async fn compensate_falco(
        &self,
        lead_payment_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
    ) -> Result<falco_compensations::Model, PaymentError> {
        let txn = self.db.begin().await?;
        let compensation =
            Self::compensate_falco_in_txn(&txn, lead_payment_id, amount, entry_date).await?;
        txn.commit().await?;
        Ok(compensation)
    }

    /// Records a shortage compensation inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `Rule(ExceedsRemaining)` when the compensation over-claims
    /// the uncompensated remainder.
    pub async fn compensate_falco_in_txn<C: ConnectionTrait>(
        conn: &C,
        lead_payment_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
    ) -> Result<falco_compensations::Model, PaymentError> {
        let batch = lead_payments_received::Entity::find_by_id(lead_payment_id)
            .one(conn)
            .await?
            .ok_or(PaymentError::BatchNotFound(lead_payment_id))?;

        let already_compensated = compensated_amount(conn, batch.id).await?;
        falco::validate_compensation(batch.falco_amount, already_compensated, amount)?;

        let compensation = falco_compensations::ActiveModel {
            id: Set(Uuid::new_v4()),
            lead_payment_id: Set(batch.id),
            amount: Set(amount),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(conn)
        .await?;

        let accounts = AccountRepository::agent_accounts(conn, batch.agent_id).await?;
        let entry = LedgerService::new_entry(
            AccountId::from_uuid(accounts.cash.id),
            EntryType::Credit,
            amount,
            EntrySource::FalcoCompensation,
            entry_date,
        )
        .map_err(BalanceError::from)?
        .with_lead_payment(LeadPaymentId::from_uuid(batch.id));
        BalanceRepository::create_entry(conn, entry).await?;

        info!(
            batch = %batch.id,
            amount = %amount,
            remaining = %falco::remaining(batch.falco_amount, already_compensated + amount),
            "recorded falco compensation"
        );

        Ok(compensation)
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

async fn find_loan<C: ConnectionTrait>(
    conn: &C,
    loan_id: Uuid,
) -> Result<loans::Model, PaymentError> {
    loans::Entity::find_by_id(loan_id)
        .one(conn)
        .await?
        .ok_or(PaymentError::LoanNotFound(loan_id))
}

/// Recomputes a payment's profit/capital split from the loan's stored
/// figures. The split lives on the ledger entry, not the payment row, so
/// every edit goes back through this.
fn split_for(loan: &loans::Model, amount: Decimal) -> PaymentSplit {
    LoanEngine::process_payment(&PaymentSplitInput {
        amount,
        loan_profit: loan.profit_amount,
        loan_total_debt: loan.total_debt_acquired,
        loan_pending: loan.pending_amount_stored,
        is_bad_debt: loan.status == LoanStatus::BadDebt,
    })
}

async fn insert_payment_row<C: ConnectionTrait>(
    conn: &C,
    loan_id: Uuid,
    lead_payment_id: Option<Uuid>,
    amount: Decimal,
    comission: Decimal,
    method: PaymentMethod,
    received_at: NaiveDate,
) -> Result<payments::Model, PaymentError> {
    Ok(payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        loan_id: Set(loan_id),
        lead_payment_id: Set(lead_payment_id),
        amount: Set(amount),
        comission: Set(comission),
        method: Set(method.into()),
        received_at: Set(received_at),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(conn)
    .await?)
}

fn income_entry(
    account_id: Uuid,
    payment: &payments::Model,
    method: PaymentMethod,
    split: &PaymentSplit,
    entry_date: NaiveDate,
) -> Result<NewEntry, BalanceError> {
    let mut entry = LedgerService::new_entry(
        AccountId::from_uuid(account_id),
        EntryType::Credit,
        payment.amount,
        method.entry_source(),
        entry_date,
    )?
    .with_split(split.profit_amount, split.return_to_capital)
    .with_loan(LoanId::from_uuid(payment.loan_id))
    .with_payment(PaymentId::from_uuid(payment.id));

    if let Some(lead) = payment.lead_payment_id {
        entry = entry.with_lead_payment(LeadPaymentId::from_uuid(lead));
    }

    Ok(entry)
}

fn comission_entry(
    account_id: Uuid,
    payment: &payments::Model,
    comission: Decimal,
    entry_date: NaiveDate,
) -> Result<NewEntry, BalanceError> {
    let mut entry = LedgerService::new_entry(
        AccountId::from_uuid(account_id),
        EntryType::Debit,
        comission,
        EntrySource::PaymentComission,
        entry_date,
    )?
    .with_loan(LoanId::from_uuid(payment.loan_id))
    .with_payment(PaymentId::from_uuid(payment.id));

    if let Some(lead) = payment.lead_payment_id {
        entry = entry.with_lead_payment(LeadPaymentId::from_uuid(lead));
    }

    Ok(entry)
}

/// Updates a loan's aggregates after a payment-shaped change (positive
/// deltas record, negative deltas revert). The status follows the pending
/// amount: settled loans finish, reopened loans go back to active (or bad
/// debt when flagged).
async fn adjust_loan_totals<C: ConnectionTrait>(
    conn: &C,
    loan: loans::Model,
    amount_delta: Decimal,
    comission_delta: Decimal,
) -> Result<loans::Model, PaymentError> {
    let total_paid = loan.total_paid + amount_delta;
    let pending = (loan.total_debt_acquired - total_paid).max(Decimal::ZERO);
    let comission_amount = loan.comission_amount + comission_delta;

    let (status, finished_date) = if pending <= PENDING_EPSILON {
        let finished = loan.finished_date.unwrap_or_else(|| chrono::Utc::now().into());
        (LoanStatus::Finished, Some(finished))
    } else if loan.bad_debt_date.is_some() {
        (LoanStatus::BadDebt, None)
    } else {
        (LoanStatus::Active, None)
    };

    let mut active: loans::ActiveModel = loan.into();
    active.total_paid = Set(total_paid);
    active.pending_amount_stored = Set(pending);
    active.comission_amount = Set(comission_amount);
    active.status = Set(status);
    active.finished_date = Set(finished_date);
    active.updated_at = Set(chrono::Utc::now().into());

    Ok(active.update(conn).await?)
}

/// Records one batch line: payment row, income entry on the method-implied
/// account, commission entry against cash (batch convention), loan update.
/// Entry rows only; the caller settles balances from the accumulated
/// deltas.
async fn record_batch_line<C: ConnectionTrait>(
    conn: &C,
    accounts: &RouteAccounts,
    batch_id: Uuid,
    line: &BatchLineInput,
    received_at: NaiveDate,
) -> Result<PaymentLine, PaymentError> {
    let loan = find_loan(conn, line.loan_id).await?;
    let comission = line.comission.unwrap_or(loan.payment_comission);
    let split = split_for(&loan, line.amount);

    let payment = insert_payment_row(
        conn,
        line.loan_id,
        Some(batch_id),
        line.amount,
        comission,
        line.method,
        received_at,
    )
    .await?;

    let income_account = match line.method {
        PaymentMethod::Cash => accounts.cash.id,
        PaymentMethod::MoneyTransfer => accounts.bank.id,
    };
    let income = income_entry(income_account, &payment, line.method, &split, received_at)?;
    BalanceRepository::insert_entry(conn, income).await?;

    if comission > Decimal::ZERO {
        let entry = comission_entry(accounts.cash.id, &payment, comission, received_at)?;
        BalanceRepository::insert_entry(conn, entry).await?;
    }

    adjust_loan_totals(conn, loan, line.amount, comission).await?;

    Ok(PaymentLine {
        amount: line.amount,
        comission,
        method: line.method,
    })
}

/// Applies an edit-request line that names an existing payment: delete,
/// in-place update, or no-op. Returns the tagged change for the diff.
async fn apply_existing_line<C: ConnectionTrait>(
    conn: &C,
    accounts: &RouteAccounts,
    batch: &lead_payments_received::Model,
    payment_id: Uuid,
    line: &EditBatchLine,
) -> Result<LineChange, PaymentError> {
    let payment = payments::Entity::find_by_id(payment_id)
        .one(conn)
        .await?
        .ok_or(PaymentError::PaymentNotFound(payment_id))?;

    let before = PaymentLine {
        amount: payment.amount,
        comission: payment.comission,
        method: payment.method.clone().into(),
    };

    if line.delete {
        let loan = find_loan(conn, payment.loan_id).await?;
        adjust_loan_totals(conn, loan, -payment.amount, -payment.comission).await?;
        BalanceRepository::delete_entries_by_payment_rows_only(conn, payment.id).await?;
        payments::Entity::delete_by_id(payment.id).exec(conn).await?;
        return Ok(LineChange::Deleted(before));
    }

    let comission = line.comission.unwrap_or(payment.comission);
    let after = PaymentLine {
        amount: line.amount,
        comission,
        method: line.method,
    };
    if after == before {
        return Ok(LineChange::Unchanged(before));
    }

    let loan = find_loan(conn, payment.loan_id).await?;
    let split = split_for(&loan, line.amount);
    adjust_loan_totals(
        conn,
        loan,
        line.amount - payment.amount,
        comission - payment.comission,
    )
    .await?;

    let mut active: payments::ActiveModel = payment.clone().into();
    active.amount = Set(line.amount);
    active.comission = Set(comission);
    active.method = Set(line.method.into());
    active.update(conn).await?;

    update_income_entry(conn, accounts, &payment, line.method, line.amount, &split).await?;
    sync_comission_entry(conn, accounts, batch, &payment, before.comission, comission).await?;

    Ok(LineChange::Edited { before, after })
}

/// Updates an edited payment's income entry in place: amount, source and
/// account follow the (possibly changed) method, and the split is
/// recomputed.
async fn update_income_entry<C: ConnectionTrait>(
    conn: &C,
    accounts: &RouteAccounts,
    payment: &payments::Model,
    method: PaymentMethod,
    amount: Decimal,
    split: &PaymentSplit,
) -> Result<(), PaymentError> {
    let income_sources = [
        sea_orm_active_enums::EntrySource::CashLoanPayment,
        sea_orm_active_enums::EntrySource::BankLoanPayment,
    ];
    let entry = account_entries::Entity::find()
        .filter(account_entries::Column::PaymentId.eq(payment.id))
        .filter(account_entries::Column::Source.is_in(income_sources))
        .one(conn)
        .await?
        .ok_or_else(|| BalanceError::EntryNotFound(payment.id))?;

    let account_id = match method {
        PaymentMethod::Cash => accounts.cash.id,
        PaymentMethod::MoneyTransfer => accounts.bank.id,
    };

    let mut active: account_entries::ActiveModel = entry.into();
    active.amount = Set(amount);
    active.account_id = Set(account_id);
    active.source = Set(method.entry_source().into());
    active.profit_amount = Set(Some(split.profit_amount));
    active.return_to_capital = Set(Some(split.return_to_capital));
    active.update(conn).await?;

    Ok(())
}

/// Brings an edited payment's commission entry in line with the new
/// commission: updated in place, created when it appears, deleted when it
/// drops to zero.
async fn sync_comission_entry<C: ConnectionTrait>(
    conn: &C,
    accounts: &RouteAccounts,
    batch: &lead_payments_received::Model,
    payment: &payments::Model,
    old_comission: Decimal,
    new_comission: Decimal,
) -> Result<(), PaymentError> {
    let existing = account_entries::Entity::find()
        .filter(account_entries::Column::PaymentId.eq(payment.id))
        .filter(
            account_entries::Column::Source.eq(sea_orm_active_enums::EntrySource::PaymentComission),
        )
        .one(conn)
        .await?;

    match (existing, new_comission > Decimal::ZERO) {
        (Some(entry), true) => {
            if old_comission != new_comission {
                let mut active: account_entries::ActiveModel = entry.into();
                active.amount = Set(new_comission);
                active.update(conn).await?;
            }
        }
        (Some(entry), false) => {
            BalanceRepository::delete_entry_rows(conn, vec![entry.id]).await?;
        }
        (None, true) => {
            let entry =
                comission_entry(accounts.cash.id, payment, new_comission, batch.received_at)?;
            BalanceRepository::insert_entry(conn, entry).await?;
        }
        (None, false) => {}
    }

    Ok(())
}

/// Brings the batch's paired transfer entries in line with the requested
/// bank total: updated in place, created when it appears, deleted when it
/// drops to zero. Row writes only; the balance movement is part of the
/// diff's net change.
async fn sync_transfer_entries<C: ConnectionTrait>(
    conn: &C,
    accounts: &RouteAccounts,
    batch: &lead_payments_received::Model,
    desired_bank_paid: Decimal,
) -> Result<(), PaymentError> {
    let existing = BalanceRepository::find_lead_entries_by_source(
        conn,
        batch.id,
        &[
            sea_orm_active_enums::EntrySource::TransferOut,
            sea_orm_active_enums::EntrySource::TransferIn,
        ],
    )
    .await?;

    if desired_bank_paid <= Decimal::ZERO {
        BalanceRepository::delete_entry_rows(
            conn,
            existing.into_iter().map(|entry| entry.id).collect(),
        )
        .await?;
        return Ok(());
    }

    if existing.is_empty() {
        BalanceRepository::insert_transfer(
            conn,
            accounts.cash.id,
            accounts.bank.id,
            desired_bank_paid,
            batch.received_at,
            Some(batch.id),
        )
        .await?;
        return Ok(());
    }

    for entry in existing {
        if entry.amount != desired_bank_paid {
            let mut active: account_entries::ActiveModel = entry.into();
            active.amount = Set(desired_bank_paid);
            active.update(conn).await?;
        }
    }

    Ok(())
}

/// Recomputes a batch's totals and status from its surviving payments.
async fn refresh_batch_totals<C: ConnectionTrait>(
    conn: &C,
    batch_id: Uuid,
    expected_amount: Option<Decimal>,
    bank_paid_amount: Option<Decimal>,
) -> Result<lead_payments_received::Model, PaymentError> {
    let batch = lead_payments_received::Entity::find_by_id(batch_id)
        .one(conn)
        .await?
        .ok_or(PaymentError::BatchNotFound(batch_id))?;

    let remaining = payments::Entity::find()
        .filter(payments::Column::LeadPaymentId.eq(batch_id))
        .all(conn)
        .await?;

    let paid_amount: Decimal = remaining.iter().map(|payment| payment.amount).sum();
    let cash_paid_amount: Decimal = remaining
        .iter()
        .filter(|payment| payment.method == sea_orm_active_enums::PaymentMethod::Cash)
        .map(|payment| payment.amount)
        .sum();

    let expected = expected_amount.unwrap_or(batch.expected_amount);
    let bank_paid = bank_paid_amount.unwrap_or(batch.bank_paid_amount);

    let mut active: lead_payments_received::ActiveModel = batch.into();
    active.expected_amount = Set(expected);
    active.paid_amount = Set(paid_amount);
    active.cash_paid_amount = Set(cash_paid_amount);
    active.bank_paid_amount = Set(bank_paid);
    active.payment_status = Set(BatchStatus::from_amounts(expected, paid_amount).into());
    active.updated_at = Set(chrono::Utc::now().into());

    Ok(active.update(conn).await?)
}

/// Sums the compensations already recorded against a batch's shortage.
async fn compensated_amount<C: ConnectionTrait>(
    conn: &C,
    lead_payment_id: Uuid,
) -> Result<Decimal, PaymentError> {
    let compensations = falco_compensations::Entity::find()
        .filter(falco_compensations::Column::LeadPaymentId.eq(lead_payment_id))
        .all(conn)
        .await?;

    Ok(compensations
        .iter()
        .map(|compensation| compensation.amount)
        .sum())
}

/// Applies the accumulated cash/bank deltas to the two accounts, skipping
/// zero writes.
async fn apply_deltas<C: ConnectionTrait>(
    conn: &C,
    accounts: &RouteAccounts,
    deltas: AccountDeltas,
) -> Result<(), PaymentError> {
    if !deltas.cash.is_zero() {
        AccountRepository::apply_balance_delta(conn, accounts.cash.id, deltas.cash).await?;
    }
    if !deltas.bank.is_zero() {
        AccountRepository::apply_balance_delta(conn, accounts.bank.id, deltas.bank).await?;
    }
    Ok(())
}
