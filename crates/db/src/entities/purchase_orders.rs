//! `SeaORM` Entity for purchase_orders table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PoStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub po_number: String,
    pub po_date: Date,
    pub vendor: String,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub po_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 10)))")]
    pub exchange_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub common_currency_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub value_in_lac: Decimal,
    pub status: PoStatus,
    pub pr_number: Option<String>,
    pub pr_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub pr_value: Option<Decimal>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::po_line_items::Entity")]
    PoLineItems,
}

impl Related<super::po_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
