//! Purchase order repository.
//!
//! Every write runs in a transaction together with its audit log entry.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use tracing::debug;
use uuid::Uuid;

use budgetrack_core::audit::NewAuditEntry;
use budgetrack_core::purchase_order::{
    PoLineItemLink, PoStatus, PurchaseOrder, PurchaseOrderError, PurchaseOrderFilter,
    PurchaseOrderStore,
};
use budgetrack_shared::types::{
    CurrencyCode, LineItemId, PageRequest, PageResponse, PurchaseOrderId, UserId,
};

use super::audit_log::AuditLogRepository;
use super::{is_unique_violation, now};
use crate::entities::sea_orm_active_enums::PoStatus as DbPoStatus;
use crate::entities::{line_items, po_line_items, purchase_orders};

/// Purchase order repository.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    db: DatabaseConnection,
}

impl PurchaseOrderRepository {
    /// Creates a new purchase order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_links<C: ConnectionTrait>(
        conn: &C,
        po_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<PoLineItemLink>>, PurchaseOrderError> {
        let mut links: HashMap<Uuid, Vec<PoLineItemLink>> = HashMap::new();
        if po_ids.is_empty() {
            return Ok(links);
        }

        let models = po_line_items::Entity::find()
            .filter(po_line_items::Column::PurchaseOrderId.is_in(po_ids))
            .order_by_asc(po_line_items::Column::CreatedAt)
            .order_by_asc(po_line_items::Column::Id)
            .all(conn)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        for model in models {
            links
                .entry(model.purchase_order_id)
                .or_default()
                .push(PoLineItemLink {
                    line_item_id: LineItemId::from_uuid(model.line_item_id),
                    allocated_amount: model.allocated_amount,
                });
        }
        Ok(links)
    }

    async fn insert_links(
        txn: &DatabaseTransaction,
        po_id: Uuid,
        links: &[PoLineItemLink],
    ) -> Result<(), PurchaseOrderError> {
        if links.is_empty() {
            return Ok(());
        }

        let timestamp = now();
        let models = links.iter().map(|link| po_line_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            purchase_order_id: Set(po_id),
            line_item_id: Set(link.line_item_id.into_inner()),
            allocated_amount: Set(link.allocated_amount),
            created_at: Set(timestamp),
        });

        po_line_items::Entity::insert_many(models)
            .exec(txn)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;
        Ok(())
    }
}

impl PurchaseOrderStore for PurchaseOrderRepository {
    async fn find_purchase_order(
        &self,
        id: PurchaseOrderId,
    ) -> Result<Option<PurchaseOrder>, PurchaseOrderError> {
        let Some(model) = purchase_orders::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut links = Self::load_links(&self.db, vec![model.id]).await?;
        let linked = links.remove(&model.id).unwrap_or_default();
        to_purchase_order(model, linked).map(Some)
    }

    async fn po_number_exists(
        &self,
        po_number: &str,
        excluding: Option<PurchaseOrderId>,
    ) -> Result<bool, PurchaseOrderError> {
        let mut query =
            purchase_orders::Entity::find().filter(purchase_orders::Column::PoNumber.eq(po_number));
        if let Some(id) = excluding {
            query = query.filter(purchase_orders::Column::Id.ne(id.into_inner()));
        }

        let count = query
            .count(&self.db)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;
        Ok(count > 0)
    }

    async fn missing_line_items(
        &self,
        ids: &[LineItemId],
    ) -> Result<Vec<LineItemId>, PurchaseOrderError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: HashSet<Uuid> = line_items::Entity::find()
            .select_only()
            .column(line_items::Column::Id)
            .filter(line_items::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?
            .into_iter()
            .collect();

        Ok(ids
            .iter()
            .copied()
            .filter(|id| !found.contains(&id.into_inner()))
            .collect())
    }

    async fn insert_purchase_order(
        &self,
        po: PurchaseOrder,
        audit: NewAuditEntry,
    ) -> Result<PurchaseOrder, PurchaseOrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        let model = to_active_model(&po)
            .insert(&txn)
            .await
            .map_err(|e| map_write_error(&e, &po.po_number))?;

        Self::insert_links(&txn, model.id, &po.linked_line_items).await?;

        AuditLogRepository::append(&txn, audit)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        debug!(po_id = %model.id, "Purchase order row inserted");
        to_purchase_order(model, po.linked_line_items)
    }

    async fn update_purchase_order(
        &self,
        po: PurchaseOrder,
        replace_links: bool,
        audit: NewAuditEntry,
    ) -> Result<PurchaseOrder, PurchaseOrderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        let mut active = to_active_model(&po);
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.created_by = sea_orm::ActiveValue::NotSet;
        let model = active
            .update(&txn)
            .await
            .map_err(|e| map_write_error(&e, &po.po_number))?;

        if replace_links {
            po_line_items::Entity::delete_many()
                .filter(po_line_items::Column::PurchaseOrderId.eq(model.id))
                .exec(&txn)
                .await
                .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;
            Self::insert_links(&txn, model.id, &po.linked_line_items).await?;
        }

        AuditLogRepository::append(&txn, audit)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        let mut links = Self::load_links(&txn, vec![model.id]).await?;

        txn.commit()
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        debug!(po_id = %model.id, replace_links, "Purchase order row updated");
        let linked = links.remove(&model.id).unwrap_or_default();
        to_purchase_order(model, linked)
    }

    async fn list_purchase_orders(
        &self,
        filter: &PurchaseOrderFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<PurchaseOrder>, PurchaseOrderError> {
        let mut query = purchase_orders::Entity::find();
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(substring_of(purchase_orders::Column::PoNumber, search))
                    .add(substring_of(purchase_orders::Column::PrNumber, search)),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(purchase_orders::Column::Status.eq(to_db_status(status)));
        }
        if let Some(vendor) = filter.vendor.as_deref() {
            query = query.filter(purchase_orders::Column::Vendor.eq(vendor));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        let models = query
            .order_by_desc(purchase_orders::Column::CreatedAt)
            .order_by_desc(purchase_orders::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| PurchaseOrderError::repository(e.to_string()))?;

        let mut links = Self::load_links(&self.db, models.iter().map(|m| m.id).collect()).await?;
        let data = models
            .into_iter()
            .map(|model| {
                let linked = links.remove(&model.id).unwrap_or_default();
                to_purchase_order(model, linked)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(data, page, total))
    }
}

/// Case-sensitive literal substring test; `%` and `_` carry no meaning.
fn substring_of(column: purchase_orders::Column, needle: &str) -> SimpleExpr {
    Expr::expr(
        Func::cust(Alias::new("strpos"))
            .arg(Expr::col(column))
            .arg(needle),
    )
    .gt(0)
}

fn map_write_error(err: &sea_orm::DbErr, po_number: &str) -> PurchaseOrderError {
    if is_unique_violation(err) {
        PurchaseOrderError::DuplicatePoNumber(po_number.to_string())
    } else {
        PurchaseOrderError::repository(err.to_string())
    }
}

fn to_active_model(po: &PurchaseOrder) -> purchase_orders::ActiveModel {
    purchase_orders::ActiveModel {
        id: Set(po.id.into_inner()),
        po_number: Set(po.po_number.clone()),
        po_date: Set(po.po_date),
        vendor: Set(po.vendor.clone()),
        currency: Set(po.currency.as_str().to_string()),
        po_value: Set(po.po_value),
        exchange_rate: Set(po.exchange_rate),
        common_currency_value: Set(po.common_currency_value),
        value_in_lac: Set(po.value_in_lac),
        status: Set(to_db_status(po.status)),
        pr_number: Set(po.pr_number.clone()),
        pr_date: Set(po.pr_date),
        pr_value: Set(po.pr_value),
        created_by: Set(po.created_by.into_inner()),
        created_at: Set(po.created_at.into()),
        updated_at: Set(po.updated_at.into()),
    }
}

const fn to_db_status(status: PoStatus) -> DbPoStatus {
    match status {
        PoStatus::Draft => DbPoStatus::Draft,
        PoStatus::Approved => DbPoStatus::Approved,
        PoStatus::Closed => DbPoStatus::Closed,
        PoStatus::Cancelled => DbPoStatus::Cancelled,
    }
}

const fn from_db_status(status: DbPoStatus) -> PoStatus {
    match status {
        DbPoStatus::Draft => PoStatus::Draft,
        DbPoStatus::Approved => PoStatus::Approved,
        DbPoStatus::Closed => PoStatus::Closed,
        DbPoStatus::Cancelled => PoStatus::Cancelled,
    }
}

fn to_purchase_order(
    model: purchase_orders::Model,
    linked_line_items: Vec<PoLineItemLink>,
) -> Result<PurchaseOrder, PurchaseOrderError> {
    Ok(PurchaseOrder {
        id: PurchaseOrderId::from_uuid(model.id),
        po_number: model.po_number,
        po_date: model.po_date,
        vendor: model.vendor,
        currency: CurrencyCode::parse(&model.currency).map_err(PurchaseOrderError::repository)?,
        po_value: model.po_value,
        exchange_rate: model.exchange_rate,
        common_currency_value: model.common_currency_value,
        value_in_lac: model.value_in_lac,
        status: from_db_status(model.status),
        pr_number: model.pr_number,
        pr_date: model.pr_date,
        pr_value: model.pr_value,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        linked_line_items,
    })
}
