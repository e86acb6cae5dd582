//! Ledger repository: append-only entries and materialized balances.
//!
//! Every entry append adjusts the owning account's materialized balance in
//! the same transaction, except where noted: batch paths insert rows only
//! and settle balances once from accumulated deltas, and `fix_balance`
//! repairs the entry log toward the stored balance without touching it.

use std::collections::HashMap;

use chrono::NaiveDate;
use prestia_core::ledger::{LedgerError, LedgerService, NewEntry, Reconciliation, ReversalSource};
use prestia_shared::types::AccountId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{account_entries, accounts, sea_orm_active_enums::EntrySource};
use crate::repositories::account::{AccountError, AccountRepository};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Entry planning rejected the input (invalid amount, same-account transfer).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Account resolution or balance write failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Ledger repository over accounts and their entries.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an entry and adjusts the account's materialized balance in
    /// the same step.
    ///
    /// # Errors
    ///
    /// Returns `Ledger(InvalidAmount)` for a non-positive amount and
    /// `Account(NotFound)` for a missing account.
    pub async fn create_entry<C: ConnectionTrait>(
        conn: &C,
        entry: NewEntry,
    ) -> Result<account_entries::Model, BalanceError> {
        let delta = entry.balance_delta();
        let model = Self::insert_entry(conn, entry).await?;
        AccountRepository::apply_balance_delta(conn, model.account_id, delta).await?;
        Ok(model)
    }

    /// Appends an entry row WITHOUT touching the materialized balance.
    ///
    /// Batch paths use this and settle the accumulated cash/bank deltas in
    /// one shot to minimize balance-update contention.
    ///
    /// # Errors
    ///
    /// Returns `Ledger(InvalidAmount)` for a non-positive amount.
    pub async fn insert_entry<C: ConnectionTrait>(
        conn: &C,
        entry: NewEntry,
    ) -> Result<account_entries::Model, BalanceError> {
        if entry.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(entry.amount).into());
        }

        Ok(entry_to_active(&entry).insert(conn).await?)
    }

    /// Creates a paired transfer: DEBIT/TRANSFER_OUT on the source account,
    /// CREDIT/TRANSFER_IN on the destination, both balances adjusted. The
    /// combined balance across the two accounts is conserved by
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount, identical accounts, or a
    /// missing account.
    pub async fn create_transfer<C: ConnectionTrait>(
        conn: &C,
        source_account_id: Uuid,
        destination_account_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        lead_payment_id: Option<Uuid>,
    ) -> Result<(account_entries::Model, account_entries::Model), BalanceError> {
        let (outgoing, incoming) = Self::plan_transfer_entries(
            source_account_id,
            destination_account_id,
            amount,
            entry_date,
            lead_payment_id,
        )?;

        let outgoing = Self::create_entry(conn, outgoing).await?;
        let incoming = Self::create_entry(conn, incoming).await?;

        Ok((outgoing, incoming))
    }

    /// Inserts a paired transfer's rows WITHOUT balance writes (batch path).
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive amount or identical accounts.
    pub async fn insert_transfer<C: ConnectionTrait>(
        conn: &C,
        source_account_id: Uuid,
        destination_account_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        lead_payment_id: Option<Uuid>,
    ) -> Result<(account_entries::Model, account_entries::Model), BalanceError> {
        let (outgoing, incoming) = Self::plan_transfer_entries(
            source_account_id,
            destination_account_id,
            amount,
            entry_date,
            lead_payment_id,
        )?;

        let outgoing = Self::insert_entry(conn, outgoing).await?;
        let incoming = Self::insert_entry(conn, incoming).await?;

        Ok((outgoing, incoming))
    }

    fn plan_transfer_entries(
        source_account_id: Uuid,
        destination_account_id: Uuid,
        amount: Decimal,
        entry_date: NaiveDate,
        lead_payment_id: Option<Uuid>,
    ) -> Result<(NewEntry, NewEntry), BalanceError> {
        let plan = LedgerService::plan_transfer(
            AccountId::from_uuid(source_account_id),
            AccountId::from_uuid(destination_account_id),
            amount,
            entry_date,
        )?;

        let mut outgoing = plan.outgoing;
        let mut incoming = plan.incoming;
        if let Some(lead_payment_id) = lead_payment_id {
            let lead = prestia_shared::types::LeadPaymentId::from_uuid(lead_payment_id);
            outgoing = outgoing.with_lead_payment(lead);
            incoming = incoming.with_lead_payment(lead);
        }

        Ok((outgoing, incoming))
    }

    /// Reverses a persisted entry by appending one of the opposite type and
    /// equal amount; the net effect restores the balance to its pre-entry
    /// value. The original entry is retained for audit.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when the original entry is absent.
    pub async fn reverse_entry<C: ConnectionTrait>(
        conn: &C,
        entry_id: Uuid,
        entry_date: NaiveDate,
    ) -> Result<account_entries::Model, BalanceError> {
        let original = account_entries::Entity::find_by_id(entry_id)
            .one(conn)
            .await?
            .ok_or(BalanceError::EntryNotFound(entry_id))?;

        let reversal = LedgerService::reversing_entry(
            &ReversalSource {
                account_id: AccountId::from_uuid(original.account_id),
                entry_type: original.entry_type.clone().into(),
                amount: original.amount,
                source: original.source.clone().into(),
                description: original.description.clone(),
            },
            entry_date,
        );

        Self::create_entry(conn, reversal).await
    }

    /// Physically removes every entry tied to a loan and reverses their net
    /// balance effect in the same step.
    ///
    /// Used ONLY by cancellation flows where the originating loan row is
    /// itself being deleted. Ordinary corrections must use [`Self::reverse_entry`]
    /// to preserve the audit trail.
    ///
    /// # Errors
    ///
    /// Returns an error if a touched account is missing or a query fails.
    pub async fn delete_entries_by_loan<C: ConnectionTrait>(
        conn: &C,
        loan_id: Uuid,
    ) -> Result<(), BalanceError> {
        let entries = account_entries::Entity::find()
            .filter(account_entries::Column::LoanId.eq(loan_id))
            .all(conn)
            .await?;

        Self::delete_entries_reverting_balances(conn, entries).await
    }

    /// Physically removes every entry tied to a payment and reverses their
    /// net balance effect in the same step. Same restrictions as
    /// [`Self::delete_entries_by_loan`].
    ///
    /// # Errors
    ///
    /// Returns an error if a touched account is missing or a query fails.
    pub async fn delete_entries_by_payment<C: ConnectionTrait>(
        conn: &C,
        payment_id: Uuid,
    ) -> Result<(), BalanceError> {
        let entries = account_entries::Entity::find()
            .filter(account_entries::Column::PaymentId.eq(payment_id))
            .all(conn)
            .await?;

        Self::delete_entries_reverting_balances(conn, entries).await
    }

    /// Physically removes every entry tied to a batch and reverses their
    /// net balance effect in the same step. Used by the flow that removes a
    /// batch after its last payment is deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if a touched account is missing or a query fails.
    pub async fn delete_entries_by_lead<C: ConnectionTrait>(
        conn: &C,
        lead_payment_id: Uuid,
    ) -> Result<(), BalanceError> {
        let entries = account_entries::Entity::find()
            .filter(account_entries::Column::LeadPaymentId.eq(lead_payment_id))
            .all(conn)
            .await?;

        Self::delete_entries_reverting_balances(conn, entries).await
    }

    /// Removes a payment's entry rows WITHOUT balance writes (batch path).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_entries_by_payment_rows_only<C: ConnectionTrait>(
        conn: &C,
        payment_id: Uuid,
    ) -> Result<(), BalanceError> {
        account_entries::Entity::delete_many()
            .filter(account_entries::Column::PaymentId.eq(payment_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// Finds every entry tied to a batch with the given source.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_lead_entries_by_source<C: ConnectionTrait>(
        conn: &C,
        lead_payment_id: Uuid,
        sources: &[EntrySource],
    ) -> Result<Vec<account_entries::Model>, BalanceError> {
        Ok(account_entries::Entity::find()
            .filter(account_entries::Column::LeadPaymentId.eq(lead_payment_id))
            .filter(account_entries::Column::Source.is_in(sources.iter().cloned()))
            .all(conn)
            .await?)
    }

    /// Removes entry rows by ID WITHOUT balance writes (batch path).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_entry_rows<C: ConnectionTrait>(
        conn: &C,
        entry_ids: Vec<Uuid>,
    ) -> Result<(), BalanceError> {
        if entry_ids.is_empty() {
            return Ok(());
        }
        account_entries::Entity::delete_many()
            .filter(account_entries::Column::Id.is_in(entry_ids))
            .exec(conn)
            .await?;
        Ok(())
    }

    async fn delete_entries_reverting_balances<C: ConnectionTrait>(
        conn: &C,
        entries: Vec<account_entries::Model>,
    ) -> Result<(), BalanceError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut net_by_account: HashMap<Uuid, Decimal> = HashMap::new();
        let mut ids = Vec::with_capacity(entries.len());
        for entry in &entries {
            *net_by_account.entry(entry.account_id).or_default() += entry.balance_delta();
            ids.push(entry.id);
        }

        account_entries::Entity::delete_many()
            .filter(account_entries::Column::Id.is_in(ids))
            .exec(conn)
            .await?;

        for (account_id, net) in net_by_account {
            AccountRepository::apply_balance_delta(conn, account_id, -net).await?;
        }

        Ok(())
    }

    /// Recomputes an account's balance from its entry log and compares it to
    /// the materialized figure.
    ///
    /// Inconsistency is the expected, correctable condition this exists to
    /// report; the call only fails when the account itself is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist.
    pub async fn reconcile_account<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
    ) -> Result<Reconciliation, BalanceError> {
        let account = AccountRepository::find_account(conn, account_id).await?;
        Self::reconcile(conn, &account).await
    }

    /// Read-only diagnostic sweep: reconciles every account.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn reconcile_all_accounts<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<Reconciliation>, BalanceError> {
        let accounts = AccountRepository::list_accounts(conn).await?;

        let mut results = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let reconciliation = Self::reconcile(conn, account).await?;
            if !reconciliation.is_consistent {
                warn!(
                    account = %account.id,
                    difference = %reconciliation.difference,
                    "account balance drifted from its entry log"
                );
            }
            results.push(reconciliation);
        }

        Ok(results)
    }

    async fn reconcile<C: ConnectionTrait>(
        conn: &C,
        account: &accounts::Model,
    ) -> Result<Reconciliation, BalanceError> {
        let entries = account_entries::Entity::find()
            .filter(account_entries::Column::AccountId.eq(account.id))
            .all(conn)
            .await?;

        let calculated = Reconciliation::calculated_from(
            entries
                .iter()
                .map(|entry| (entry.entry_type.clone().into(), entry.amount)),
        );

        Ok(Reconciliation::new(
            AccountId::from_uuid(account.id),
            account.amount,
            calculated,
        ))
    }

    /// Repairs a drifted account by appending one BALANCE_ADJUSTMENT entry
    /// whose type and magnitude exactly cancel the difference.
    ///
    /// The materialized balance is ground truth during repair, so the entry
    /// row is appended WITHOUT a balance write: the adjustment moves the
    /// calculated figure toward the stored one, never the reverse. A
    /// consistent account is a no-op returning `None`, which makes a second
    /// call idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist.
    pub async fn fix_balance<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        entry_date: NaiveDate,
        description: Option<String>,
    ) -> Result<Option<account_entries::Model>, BalanceError> {
        let reconciliation = Self::reconcile_account(conn, account_id).await?;

        let Some(adjustment) = reconciliation.adjustment(entry_date, description) else {
            return Ok(None);
        };

        info!(
            account = %account_id,
            difference = %reconciliation.difference,
            entry_type = ?adjustment.entry_type,
            amount = %adjustment.amount,
            "appending balance adjustment"
        );

        let model = Self::insert_entry(conn, adjustment).await?;
        Ok(Some(model))
    }

    /// Convenience wrapper that runs [`Self::fix_balance`] in its own
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the transaction
    /// fails.
    pub async fn fix_balance_standalone(
        &self,
        account_id: Uuid,
        entry_date: NaiveDate,
        description: Option<String>,
    ) -> Result<Option<account_entries::Model>, BalanceError> {
        let txn = self.db.begin().await?;
        let result = Self::fix_balance(&txn, account_id, entry_date, description).await?;
        txn.commit().await?;
        Ok(result)
    }
}

/// Converts a planned entry into an insertable row.
fn entry_to_active(entry: &NewEntry) -> account_entries::ActiveModel {
    account_entries::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(entry.account_id.into_inner()),
        amount: Set(entry.amount),
        entry_type: Set(entry.entry_type.into()),
        source: Set(entry.source.into()),
        profit_amount: Set(entry.profit_amount),
        return_to_capital: Set(entry.return_to_capital),
        loan_id: Set(entry.loan_id.map(prestia_shared::types::LoanId::into_inner)),
        payment_id: Set(entry.payment_id.map(prestia_shared::types::PaymentId::into_inner)),
        lead_payment_id: Set(entry
            .lead_payment_id
            .map(prestia_shared::types::LeadPaymentId::into_inner)),
        destination_account_id: Set(entry
            .destination_account_id
            .map(prestia_shared::types::AccountId::into_inner)),
        sync_id: Set(entry.sync_id),
        description: Set(entry.description.clone()),
        entry_date: Set(entry.entry_date),
        created_at: Set(chrono::Utc::now().into()),
    }
}
