//! `SeaORM` Entity for the account_entries table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntrySource, EntryType};

/// An immutable, append-only ledger row.
///
/// `amount` is always a non-negative magnitude; the sign of the balance
/// effect comes from `entry_type`. Rows are never updated or hard-deleted
/// except as part of the documented cancellation sequences that remove the
/// owning loan or payment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub entry_type: EntryType,
    pub source: EntrySource,
    pub profit_amount: Option<Decimal>,
    pub return_to_capital: Option<Decimal>,
    pub loan_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub lead_payment_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub sync_id: Uuid,
    pub description: Option<String>,
    pub entry_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Returns the signed effect of this entry on its account's balance.
    #[must_use]
    pub fn balance_delta(&self) -> Decimal {
        match self.entry_type {
            EntryType::Debit => -self.amount,
            EntryType::Credit => self.amount,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::loans::Entity",
        from = "Column::LoanId",
        to = "super::loans::Column::Id"
    )]
    Loans,
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
    #[sea_orm(
        belongs_to = "super::lead_payments_received::Entity",
        from = "Column::LeadPaymentId",
        to = "super::lead_payments_received::Column::Id"
    )]
    LeadPaymentsReceived,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::lead_payments_received::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadPaymentsReceived.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
