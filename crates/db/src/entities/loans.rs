//! `SeaORM` Entity for the loans table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LoanStatus;

/// A debt instrument.
///
/// Invariant: `pending_amount_stored = max(0, total_debt_acquired - total_paid)`;
/// the status flips to `Finished` exactly when the pending amount drops to
/// the settlement epsilon. `previous_loan_id` carries a unique constraint so
/// a predecessor has at most one active successor.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lead_id: Uuid,
    pub route_id: Uuid,
    pub requested_amount: Decimal,
    pub amount_gived: Decimal,
    pub rate: Decimal,
    pub week_duration: i32,
    pub profit_amount: Decimal,
    pub total_debt_acquired: Decimal,
    pub expected_weekly_payment: Decimal,
    pub profit_ratio: Decimal,
    pub pending_amount_stored: Decimal,
    pub total_paid: Decimal,
    pub comission_amount: Decimal,
    pub payment_comission: Decimal,
    pub status: LoanStatus,
    pub sign_date: Date,
    pub finished_date: Option<DateTimeWithTimeZone>,
    pub bad_debt_date: Option<Date>,
    #[sea_orm(unique)]
    pub previous_loan_id: Option<Uuid>,
    pub previous_pending_settled: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::account_entries::Entity")]
    AccountEntries,
    #[sea_orm(
        belongs_to = "super::routes::Entity",
        from = "Column::RouteId",
        to = "super::routes::Column::Id"
    )]
    Routes,
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

impl Related<super::routes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Routes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
