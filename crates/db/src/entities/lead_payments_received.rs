//! `SeaORM` Entity for the lead_payments_received table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BatchPaymentStatus;

/// A batch: one field agent's collection run for one lead on one date.
///
/// Owns zero or more payments and is deleted automatically when its last
/// constituent payment is removed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "lead_payments_received")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lead_id: Uuid,
    pub agent_id: Uuid,
    pub expected_amount: Decimal,
    pub paid_amount: Decimal,
    pub cash_paid_amount: Decimal,
    pub bank_paid_amount: Decimal,
    pub falco_amount: Decimal,
    pub payment_status: BatchPaymentStatus,
    pub received_at: Date,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::account_entries::Entity")]
    AccountEntries,
    #[sea_orm(has_many = "super::falco_compensations::Entity")]
    FalcoCompensations,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::AgentId",
        to = "super::employees::Column::Id"
    )]
    Employees,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::account_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountEntries.def()
    }
}

impl Related<super::falco_compensations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FalcoCompensations.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
