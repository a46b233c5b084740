//! `SeaORM` Entity for line_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub uid: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub fiscal_year: i32,
    pub tower_id: Uuid,
    pub budget_head_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_budget: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::towers::Entity",
        from = "Column::TowerId",
        to = "super::towers::Column::Id"
    )]
    Towers,
    #[sea_orm(
        belongs_to = "super::budget_heads::Entity",
        from = "Column::BudgetHeadId",
        to = "super::budget_heads::Column::Id"
    )]
    BudgetHeads,
    #[sea_orm(has_many = "super::monthly_allocations::Entity")]
    MonthlyAllocations,
    #[sea_orm(has_many = "super::actuals::Entity")]
    Actuals,
}

impl Related<super::towers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Towers.def()
    }
}

impl Related<super::budget_heads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetHeads.def()
    }
}

impl Related<super::monthly_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyAllocations.def()
    }
}

impl Related<super::actuals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actuals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
