//! `SeaORM` Entity for the payments table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentMethod;

/// One collection event against a loan.
///
/// The profit/capital split is NOT stored here; it is recomputed from the
/// loan's profit ratio at record time and persisted on the corresponding
/// ledger entry, so edits must recompute it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub loan_id: Uuid,
    pub lead_payment_id: Option<Uuid>,
    pub amount: Decimal,
    pub comission: Decimal,
    pub method: PaymentMethod,
    pub received_at: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loans::Entity",
        from = "Column::LoanId",
        to = "super::loans::Column::Id"
    )]
    Loans,
    #[sea_orm(
        belongs_to = "super::lead_payments_received::Entity",
        from = "Column::LeadPaymentId",
        to = "super::lead_payments_received::Column::Id"
    )]
    LeadPaymentsReceived,
    #[sea_orm(has_many = "super::account_entries::Entity")]
    AccountEntries,
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl Related<super::lead_payments_received::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadPaymentsReceived.def()
    }
}

impl Related<super::account_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
