//! `SeaORM` Entity for monthly_allocations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub line_item_id: Uuid,
    pub month: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub amount: Option<Decimal>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::line_items::Entity",
        from = "Column::LineItemId",
        to = "super::line_items::Column::Id",
        on_delete = "Cascade"
    )]
    LineItems,
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
