//! Loan repository: creation (with renewals and an optional immediate first
//! payment), bad-debt flagging, and cancellation with restore.

use chrono::NaiveDate;
use prestia_core::ledger::{EntrySource, EntryType, LedgerService};
use prestia_core::loan::{
    CancelLoanInput, CancelOutcome, CreateLoanInput, LoanEngine, PaymentSnapshot, PreviousLoanData,
};
use prestia_core::payment::PaymentMethod;
use prestia_shared::types::{AccountId, LoanId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::LoanStatus;
use crate::entities::{loans, payments};
use crate::repositories::account::{AccountError, AccountRepository};
use crate::repositories::balance::{BalanceError, BalanceRepository};
use crate::repositories::payment::{PaymentError, PaymentRepository, RecordPaymentInput};

/// Error types for loan lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum LoanError {
    /// Loan not found.
    #[error("Loan not found: {0}")]
    NotFound(Uuid),

    /// The predecessor already has a successor (unique renewal constraint).
    #[error("Loan {previous} was already renewed by loan {successor}")]
    AlreadyRenewed {
        /// The predecessor loan.
        previous: Uuid,
        /// Its existing successor.
        successor: Uuid,
    },

    /// Payment orchestration failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

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

/// An immediate first payment collected at loan signing.
#[derive(Debug, Clone)]
pub struct FirstPayment {
    /// The collected amount.
    pub amount: Decimal,
    /// Collector commission; defaults to the loan's configured rate.
    pub comission: Option<Decimal>,
    /// How the payment was received.
    pub method: PaymentMethod,
}

/// Input for creating one loan.
#[derive(Debug, Clone)]
pub struct CreateLoanRequest {
    /// The lead receiving the loan.
    pub lead_id: Uuid,
    /// The route that disburses and collects it.
    pub route_id: Uuid,
    /// The amount the client requested.
    pub requested_amount: Decimal,
    /// The profit rate applied to the requested amount.
    pub rate: Decimal,
    /// The repayment term in weeks.
    pub week_duration: u32,
    /// The signing date.
    pub sign_date: NaiveDate,
    /// Commission paid out at grant time.
    pub grant_comission: Decimal,
    /// Default collector commission for payments against this loan.
    pub payment_comission: Decimal,
    /// The loan being renewed, if any.
    pub previous_loan_id: Option<Uuid>,
    /// An advance payment collected at signing, if any.
    pub first_payment: Option<FirstPayment>,
}

/// Result of a cancellation attempt.
#[derive(Debug, Clone)]
pub struct CancelLoanResult {
    /// The computed refund and payment disposition.
    pub outcome: CancelOutcome,
    /// Whether the loan was actually removed. False when the payment
    /// history requires operator judgment; nothing was mutated then.
    pub cancelled: bool,
}

/// Loan repository for lifecycle operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates one loan in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced row is missing or a constraint is
    /// violated; nothing is persisted in that case.
    pub async fn create_loan(&self, request: CreateLoanRequest) -> Result<loans::Model, LoanError> {
        let txn = self.db.begin().await?;
        let loan = Self::create_loan_in_txn(&txn, request).await?;
        txn.commit().await?;
        Ok(loan)
    }

    /// Creates a batch of loans as one transaction: either every loan (and
    /// every first payment) lands, or none do.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the whole batch rolls back.
    pub async fn create_loans(
        &self,
        requests: Vec<CreateLoanRequest>,
    ) -> Result<Vec<loans::Model>, LoanError> {
        let txn = self.db.begin().await?;

        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            created.push(Self::create_loan_in_txn(&txn, request).await?);
        }

        txn.commit().await?;
        Ok(created)
    }

    /// Creates one loan inside the caller's transaction.
    ///
    /// For a renewal the predecessor's entire pending balance is settled
    /// (pending zeroed, status finished) and retained on the successor so a
    /// later cancellation can reopen it; the disbursed cash and grant
    /// commission are debited from the route's cash fund; an optional first
    /// payment goes through the regular payment path.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRenewed` when the predecessor has a successor, and
    /// `NotFound` for a missing predecessor.
    pub async fn create_loan_in_txn<C: ConnectionTrait>(
        conn: &C,
        request: CreateLoanRequest,
    ) -> Result<loans::Model, LoanError> {
        let input = CreateLoanInput {
            requested_amount: request.requested_amount,
            rate: request.rate,
            week_duration: request.week_duration,
        };

        let (figures, previous_pending_settled) = match request.previous_loan_id {
            Some(previous_loan_id) => {
                let previous = Self::find_loan(conn, previous_loan_id).await?;

                if let Some(successor) = loans::Entity::find()
                    .filter(loans::Column::PreviousLoanId.eq(previous_loan_id))
                    .one(conn)
                    .await?
                {
                    return Err(LoanError::AlreadyRenewed {
                        previous: previous_loan_id,
                        successor: successor.id,
                    });
                }

                let previous_data = PreviousLoanData {
                    pending_amount: previous.pending_amount_stored,
                    profit_amount: previous.profit_amount,
                    total_debt: previous.total_debt_acquired,
                };
                let figures = LoanEngine::create_loan(&input, Some(&previous_data));
                let settled = previous.pending_amount_stored;

                // The renewal pays off the predecessor in full.
                let mut active: loans::ActiveModel = previous.into();
                active.pending_amount_stored = Set(Decimal::ZERO);
                active.status = Set(LoanStatus::Finished);
                active.finished_date = Set(Some(chrono::Utc::now().into()));
                active.updated_at = Set(chrono::Utc::now().into());
                active.update(conn).await?;

                (figures, settled)
            }
            None => (LoanEngine::create_loan(&input, None), Decimal::ZERO),
        };

        let now = chrono::Utc::now();
        let loan = loans::ActiveModel {
            id: Set(Uuid::new_v4()),
            lead_id: Set(request.lead_id),
            route_id: Set(request.route_id),
            requested_amount: Set(request.requested_amount),
            amount_gived: Set(figures.amount_gived),
            rate: Set(request.rate),
            week_duration: Set(request.week_duration as i32),
            profit_amount: Set(figures.profit_amount),
            total_debt_acquired: Set(figures.total_debt_acquired),
            expected_weekly_payment: Set(figures.expected_weekly_payment),
            profit_ratio: Set(figures.profit_ratio),
            pending_amount_stored: Set(figures.pending_amount),
            total_paid: Set(Decimal::ZERO),
            comission_amount: Set(request.grant_comission),
            payment_comission: Set(request.payment_comission),
            status: Set(LoanStatus::Active),
            sign_date: Set(request.sign_date),
            finished_date: Set(None),
            bad_debt_date: Set(None),
            previous_loan_id: Set(request.previous_loan_id),
            previous_pending_settled: Set(previous_pending_settled),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await?;

        let accounts = AccountRepository::route_accounts(conn, request.route_id).await?;

        if figures.amount_gived > Decimal::ZERO {
            let entry = LedgerService::new_entry(
                AccountId::from_uuid(accounts.cash.id),
                EntryType::Debit,
                figures.amount_gived,
                EntrySource::LoanGrant,
                request.sign_date,
            )
            .map_err(BalanceError::from)?
            .with_loan(LoanId::from_uuid(loan.id));
            BalanceRepository::create_entry(conn, entry).await?;
        }

        if request.grant_comission > Decimal::ZERO {
            let entry = LedgerService::new_entry(
                AccountId::from_uuid(accounts.cash.id),
                EntryType::Debit,
                request.grant_comission,
                EntrySource::LoanGrantComission,
                request.sign_date,
            )
            .map_err(BalanceError::from)?
            .with_loan(LoanId::from_uuid(loan.id));
            BalanceRepository::create_entry(conn, entry).await?;
        }

        if let Some(first_payment) = request.first_payment {
            PaymentRepository::record_payment_in_txn(
                conn,
                RecordPaymentInput {
                    loan_id: loan.id,
                    amount: first_payment.amount,
                    comission: first_payment.comission,
                    method: first_payment.method,
                    received_at: request.sign_date,
                },
            )
            .await?;

            // The payment moved the loan's aggregates.
            return Self::find_loan(conn, loan.id).await;
        }

        Ok(loan)
    }

    /// Flags a loan as bad debt; subsequent payments allocate 100% to
    /// profit.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan does not exist.
    pub async fn mark_bad_debt(
        &self,
        loan_id: Uuid,
        date: NaiveDate,
    ) -> Result<loans::Model, LoanError> {
        let loan = Self::find_loan(&self.db, loan_id).await?;

        let mut active: loans::ActiveModel = loan.into();
        active.bad_debt_date = Set(Some(date));
        active.status = Set(LoanStatus::BadDebt);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Cancels an erroneous or renewal loan in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing; nothing is persisted on
    /// failure.
    pub async fn cancel_loan(&self, loan_id: Uuid) -> Result<CancelLoanResult, LoanError> {
        let txn = self.db.begin().await?;
        let result = Self::cancel_loan_in_txn(&txn, loan_id).await?;
        txn.commit().await?;
        Ok(result)
    }

    /// Cancels a loan inside the caller's transaction.
    ///
    /// A loan with no payments, or a single payment received on the sign
    /// date, is reversible: its payment, its entries, and the loan row are
    /// removed (restoring every balance), and a renewal's predecessor is
    /// reopened with the pending amount the renewal had settled. Any other
    /// payment history implies real collection activity: nothing is mutated
    /// and the outcome reports the payments for operator review.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing.
    pub async fn cancel_loan_in_txn<C: ConnectionTrait>(
        conn: &C,
        loan_id: Uuid,
    ) -> Result<CancelLoanResult, LoanError> {
        let loan = Self::find_loan(conn, loan_id).await?;

        let loan_payments = payments::Entity::find()
            .filter(payments::Column::LoanId.eq(loan_id))
            .all(conn)
            .await?;

        let outcome = LoanEngine::cancel_loan(&CancelLoanInput {
            amount_gived: loan.amount_gived,
            comission_amount: loan.comission_amount,
            sign_date: loan.sign_date,
            payments: loan_payments
                .iter()
                .map(|payment| PaymentSnapshot {
                    amount: payment.amount,
                    received_on: payment.received_at,
                })
                .collect(),
        });

        if outcome.has_unaffected_payments {
            // Real collection history: leave everything in place and let an
            // operator decide.
            return Ok(CancelLoanResult {
                outcome,
                cancelled: false,
            });
        }

        for payment in &loan_payments {
            PaymentRepository::delete_payment_in_txn(conn, payment.id).await?;
        }

        BalanceRepository::delete_entries_by_loan(conn, loan.id).await?;

        if let Some(previous_loan_id) = loan.previous_loan_id {
            let previous = Self::find_loan(conn, previous_loan_id).await?;
            let status = if previous.bad_debt_date.is_some() {
                LoanStatus::BadDebt
            } else {
                LoanStatus::Active
            };

            let mut active: loans::ActiveModel = previous.into();
            active.pending_amount_stored = Set(loan.previous_pending_settled);
            active.status = Set(status);
            active.finished_date = Set(None);
            active.updated_at = Set(chrono::Utc::now().into());
            active.update(conn).await?;
        }

        loans::Entity::delete_by_id(loan.id).exec(conn).await?;

        info!(
            loan = %loan.id,
            restored = %outcome.amount_to_restore,
            first_payment_deducted = outcome.first_payment_deducted,
            "cancelled loan"
        );

        Ok(CancelLoanResult {
            outcome,
            cancelled: true,
        })
    }

    async fn find_loan<C: ConnectionTrait>(
        conn: &C,
        loan_id: Uuid,
    ) -> Result<loans::Model, LoanError> {
        loans::Entity::find_by_id(loan_id)
            .one(conn)
            .await?
            .ok_or(LoanError::NotFound(loan_id))
    }
}
