//! Line item repository.
//!
//! Stores line items with their twelve monthly allocations and serves the
//! storage side of the budget aggregator.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use budgetrack_core::actuals::Actual;
use budgetrack_core::budget::{
    BudgetError, LineItem, LineItemDetail, LineItemFilter, LineItemStore, MonthlyAllocation,
    NewLineItem, sum_allocations,
};
use budgetrack_core::fiscal::{FiscalYear, Month};
use budgetrack_core::spreadsheet::BudgetExportRow;
use budgetrack_shared::types::{BudgetHeadId, LineItemId, TowerId};
use uuid::Uuid;

use super::actual::to_actual;
use super::{is_unique_violation, now};
use crate::entities::{actuals, budget_heads, line_items, monthly_allocations, towers};

/// Line item repository.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    db: DatabaseConnection,
}

impl LineItemRepository {
    /// Creates a new line item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a line item with an empty allocation for every month.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::DuplicateUid` if the uid is taken, or a not-found
    /// error for an unknown tower or budget head.
    pub async fn create_line_item(&self, input: NewLineItem) -> Result<LineItem, BudgetError> {
        input.validate()?;
        let uid = input.uid.trim().to_string();

        let tower = towers::Entity::find_by_id(input.tower_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;
        if tower.is_none() {
            return Err(BudgetError::TowerNotFound(input.tower_id));
        }

        let head = budget_heads::Entity::find_by_id(input.budget_head_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;
        if head.is_none() {
            return Err(BudgetError::BudgetHeadNotFound(input.budget_head_id));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        let timestamp = now();
        let model = line_items::ActiveModel {
            id: Set(LineItemId::new().into_inner()),
            uid: Set(uid.clone()),
            description: Set(input.description.trim().to_string()),
            fiscal_year: Set(input.fiscal_year.year()),
            tower_id: Set(input.tower_id.into_inner()),
            budget_head_id: Set(input.budget_head_id.into_inner()),
            total_budget: Set(Decimal::ZERO),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BudgetError::DuplicateUid(uid.clone())
            } else {
                BudgetError::repository(e.to_string())
            }
        })?;

        let allocations = Month::FISCAL_ORDER.map(|month| monthly_allocations::ActiveModel {
            id: Set(Uuid::now_v7()),
            line_item_id: Set(model.id),
            month: Set(month.label().to_string()),
            amount: Set(None),
            updated_at: Set(timestamp),
        });
        monthly_allocations::Entity::insert_many(allocations)
            .exec(&txn)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        info!(line_item_id = %model.id, uid = %model.uid, "Line item created");
        Ok(to_line_item(model))
    }

    /// Lists line items ordered by uid.
    pub async fn list_line_items(
        &self,
        filter: &LineItemFilter,
    ) -> Result<Vec<LineItem>, BudgetError> {
        let mut query = line_items::Entity::find();
        if let Some(fy) = filter.fiscal_year {
            query = query.filter(line_items::Column::FiscalYear.eq(fy.year()));
        }
        if let Some(tower_id) = filter.tower_id {
            query = query.filter(line_items::Column::TowerId.eq(tower_id.into_inner()));
        }
        if let Some(head_id) = filter.budget_head_id {
            query = query.filter(line_items::Column::BudgetHeadId.eq(head_id.into_inner()));
        }

        let models = query
            .order_by_asc(line_items::Column::Uid)
            .all(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_line_item).collect())
    }

    /// Loads a line item with its names, allocations and applied actuals.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::LineItemNotFound` if the line item does not exist.
    pub async fn get_line_item_detail(&self, id: LineItemId) -> Result<LineItemDetail, BudgetError> {
        let line_item = self
            .find_line_item(id)
            .await?
            .ok_or(BudgetError::LineItemNotFound(id))?;

        let tower_name = towers::Entity::find_by_id(line_item.tower_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?
            .map(|t| t.name)
            .unwrap_or_default();

        let budget_head_name = budget_heads::Entity::find_by_id(line_item.budget_head_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?
            .map(|h| h.name)
            .unwrap_or_default();

        let allocations = self.list_allocations(id).await?;
        let actuals = self.list_applied_actuals(id).await?;

        Ok(LineItemDetail {
            line_item,
            tower_name,
            budget_head_name,
            allocations,
            actuals,
        })
    }

    /// Builds spreadsheet rows for every line item, optionally in one fiscal year.
    pub async fn list_export_rows(
        &self,
        fiscal_year: Option<FiscalYear>,
    ) -> Result<Vec<BudgetExportRow>, BudgetError> {
        let items = self
            .list_line_items(&LineItemFilter {
                fiscal_year,
                ..LineItemFilter::default()
            })
            .await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let tower_names: HashMap<Uuid, String> = towers::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let head_names: HashMap<Uuid, String> = budget_heads::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?
            .into_iter()
            .map(|h| (h.id, h.name))
            .collect();

        let ids: Vec<Uuid> = items.iter().map(|i| i.id.into_inner()).collect();
        let mut by_item: HashMap<Uuid, Vec<(Month, Option<Decimal>)>> = HashMap::new();
        for model in monthly_allocations::Entity::find()
            .filter(monthly_allocations::Column::LineItemId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?
        {
            let allocation = to_allocation(model)?;
            by_item
                .entry(allocation.line_item_id.into_inner())
                .or_default()
                .push((allocation.month, allocation.amount));
        }

        Ok(items
            .into_iter()
            .map(|item| {
                let id = item.id.into_inner();
                let mut allocations = by_item.remove(&id).unwrap_or_default();
                allocations.sort_by_key(|(month, _)| month.fiscal_index());
                BudgetExportRow {
                    uid: item.uid,
                    description: item.description,
                    tower: tower_names
                        .get(&item.tower_id.into_inner())
                        .cloned()
                        .unwrap_or_default(),
                    budget_head: head_names
                        .get(&item.budget_head_id.into_inner())
                        .cloned()
                        .unwrap_or_default(),
                    allocations,
                    total_budget: item.total_budget,
                }
            })
            .collect())
    }
}

impl LineItemStore for LineItemRepository {
    async fn find_line_item(&self, id: LineItemId) -> Result<Option<LineItem>, BudgetError> {
        let model = line_items::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        Ok(model.map(to_line_item))
    }

    async fn find_line_item_by_uid(&self, uid: &str) -> Result<Option<LineItem>, BudgetError> {
        let model = line_items::Entity::find()
            .filter(line_items::Column::Uid.eq(uid.trim()))
            .one(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        Ok(model.map(to_line_item))
    }

    async fn list_allocations(&self, id: LineItemId) -> Result<Vec<MonthlyAllocation>, BudgetError> {
        load_allocations(&self.db, id).await
    }

    async fn list_applied_actuals(&self, id: LineItemId) -> Result<Vec<Actual>, BudgetError> {
        let models = actuals::Entity::find()
            .filter(actuals::Column::LineItemId.eq(id.into_inner()))
            .order_by_asc(actuals::Column::InvoiceDate)
            .all(&self.db)
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;

        models
            .into_iter()
            .map(to_actual)
            .collect::<Result<Vec<_>, _>>()
            .map_err(BudgetError::Repository)
    }

    async fn upsert_allocations(
        &self,
        id: LineItemId,
        entries: &[(Month, Decimal)],
    ) -> Result<Decimal, BudgetError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;
        lock_line_item(&txn, id).await?;

        let timestamp = now();
        for (month, amount) in entries {
            let model = monthly_allocations::ActiveModel {
                id: Set(Uuid::now_v7()),
                line_item_id: Set(id.into_inner()),
                month: Set(month.label().to_string()),
                amount: Set(Some(*amount)),
                updated_at: Set(timestamp),
            };
            monthly_allocations::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        monthly_allocations::Column::LineItemId,
                        monthly_allocations::Column::Month,
                    ])
                    .update_columns([
                        monthly_allocations::Column::Amount,
                        monthly_allocations::Column::UpdatedAt,
                    ])
                    .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(|e| BudgetError::repository(e.to_string()))?;
        }

        let total = write_total(&txn, id).await?;
        txn.commit()
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;
        Ok(total)
    }

    async fn refresh_total(&self, id: LineItemId) -> Result<Decimal, BudgetError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;
        lock_line_item(&txn, id).await?;

        let total = write_total(&txn, id).await?;
        txn.commit()
            .await
            .map_err(|e| BudgetError::repository(e.to_string()))?;
        Ok(total)
    }
}

/// `SELECT ... FOR UPDATE` on the line item row; serializes total writers.
async fn lock_line_item<C: ConnectionTrait>(conn: &C, id: LineItemId) -> Result<(), BudgetError> {
    let locked = line_items::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| BudgetError::repository(e.to_string()))?;

    match locked {
        Some(_) => Ok(()),
        None => Err(BudgetError::LineItemNotFound(id)),
    }
}

async fn load_allocations<C: ConnectionTrait>(
    conn: &C,
    id: LineItemId,
) -> Result<Vec<MonthlyAllocation>, BudgetError> {
    let models = monthly_allocations::Entity::find()
        .filter(monthly_allocations::Column::LineItemId.eq(id.into_inner()))
        .all(conn)
        .await
        .map_err(|e| BudgetError::repository(e.to_string()))?;

    let mut allocations = models
        .into_iter()
        .map(to_allocation)
        .collect::<Result<Vec<_>, _>>()?;
    allocations.sort_by_key(|a| a.month.fiscal_index());
    Ok(allocations)
}

/// Sums the allocations visible to `conn` and stores the result as the total.
async fn write_total<C: ConnectionTrait>(conn: &C, id: LineItemId) -> Result<Decimal, BudgetError> {
    let allocations = load_allocations(conn, id).await?;
    let total = sum_allocations(&allocations)?;

    line_items::Entity::update_many()
        .col_expr(line_items::Column::TotalBudget, Expr::value(total))
        .col_expr(line_items::Column::UpdatedAt, Expr::value(now()))
        .filter(line_items::Column::Id.eq(id.into_inner()))
        .exec(conn)
        .await
        .map_err(|e| BudgetError::repository(e.to_string()))?;

    debug!(line_item_id = %id, %total, months = allocations.len(), "Stored total budget");
    Ok(total)
}

fn to_line_item(model: line_items::Model) -> LineItem {
    LineItem {
        id: LineItemId::from_uuid(model.id),
        uid: model.uid,
        description: model.description,
        fiscal_year: FiscalYear(model.fiscal_year),
        tower_id: TowerId::from_uuid(model.tower_id),
        budget_head_id: BudgetHeadId::from_uuid(model.budget_head_id),
        total_budget: model.total_budget,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn to_allocation(model: monthly_allocations::Model) -> Result<MonthlyAllocation, BudgetError> {
    let month = Month::parse(&model.month)
        .ok_or_else(|| BudgetError::repository(format!("invalid stored month: {}", model.month)))?;

    Ok(MonthlyAllocation {
        line_item_id: LineItemId::from_uuid(model.line_item_id),
        month,
        amount: model.amount,
    })
}
