//! `SeaORM` Entity for the falco_compensations table.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One compensation payment against a batch's reported shortage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "falco_compensations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lead_payment_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lead_payments_received::Entity",
        from = "Column::LeadPaymentId",
        to = "super::lead_payments_received::Column::Id"
    )]
    LeadPaymentsReceived,
}

impl Related<super::lead_payments_received::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadPaymentsReceived.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
