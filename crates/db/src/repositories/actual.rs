//! Actuals repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use budgetrack_core::actuals::{
    Actual, ActualFilter, ActualStore, ActualsError, NewActual,
};
use budgetrack_core::fiscal::Month;
use budgetrack_shared::types::{
    ActualId, CurrencyCode, LineItemId, PageRequest, PageResponse,
};

use super::now;
use crate::entities::{actuals, line_items};

/// Actuals repository implementation.
#[derive(Debug, Clone)]
pub struct ActualRepository {
    db: DatabaseConnection,
}

impl ActualRepository {
    /// Create a new actuals repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ActualStore for ActualRepository {
    async fn find_actual(&self, id: ActualId) -> Result<Option<Actual>, ActualsError> {
        let model = actuals::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;

        model
            .map(to_actual)
            .transpose()
            .map_err(ActualsError::Repository)
    }

    async fn line_item_exists(&self, id: LineItemId) -> Result<bool, ActualsError> {
        let count = line_items::Entity::find_by_id(id.into_inner())
            .count(&self.db)
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;

        Ok(count > 0)
    }

    async fn apply_to_line_item(
        &self,
        actual_id: ActualId,
        line_item_id: LineItemId,
        month: Month,
    ) -> Result<Actual, ActualsError> {
        let model = actuals::Entity::find_by_id(actual_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?
            .ok_or(ActualsError::ActualNotFound(actual_id))?;

        let mut active: actuals::ActiveModel = model.into();
        active.line_item_id = Set(Some(line_item_id.into_inner()));
        active.month = Set(Some(month.label().to_string()));

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;

        to_actual(updated).map_err(ActualsError::Repository)
    }

    async fn insert_actuals(&self, actuals_in: Vec<NewActual>) -> Result<Vec<Actual>, ActualsError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;

        let created_at = now();
        let mut inserted = Vec::with_capacity(actuals_in.len());
        for new in actuals_in {
            let model = actuals::ActiveModel {
                id: Set(ActualId::new().into_inner()),
                invoice_no: Set(new.invoice_no),
                invoice_date: Set(Some(new.invoice_date)),
                vendor: Set(new.vendor),
                description: Set(new.description),
                amount: Set(new.amount),
                currency: Set(new.currency.as_str().to_string()),
                converted_amount: Set(new.converted_amount),
                month: Set(Some(new.month.label().to_string())),
                line_item_id: Set(None),
                created_at: Set(created_at),
            }
            .insert(&txn)
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;
            inserted.push(model);
        }

        txn.commit()
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;

        info!(count = inserted.len(), "Inserted actuals batch");
        inserted
            .into_iter()
            .map(to_actual)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ActualsError::Repository)
    }

    async fn list_actuals(
        &self,
        filter: &ActualFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Actual>, ActualsError> {
        let mut query = actuals::Entity::find();
        if filter.unapplied_only {
            query = query.filter(actuals::Column::LineItemId.is_null());
        }
        if let Some(line_item_id) = filter.line_item_id {
            query = query.filter(actuals::Column::LineItemId.eq(line_item_id.into_inner()));
        }
        if let Some(month) = filter.month {
            query = query.filter(actuals::Column::Month.eq(month.label()));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;

        let models = query
            .order_by_desc(actuals::Column::CreatedAt)
            .order_by_desc(actuals::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| ActualsError::repository(e.to_string()))?;

        let data = models
            .into_iter()
            .map(to_actual)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ActualsError::Repository)?;

        Ok(PageResponse::new(data, page, total))
    }
}

/// Converts a stored row into the domain type.
pub(crate) fn to_actual(model: actuals::Model) -> Result<Actual, String> {
    let month = model
        .month
        .as_deref()
        .map(|m| Month::parse(m).ok_or_else(|| format!("invalid stored month: {m}")))
        .transpose()?;

    Ok(Actual {
        id: ActualId::from_uuid(model.id),
        invoice_no: model.invoice_no,
        invoice_date: model.invoice_date,
        vendor: model.vendor,
        description: model.description,
        amount: model.amount,
        currency: CurrencyCode::parse(&model.currency)?,
        converted_amount: model.converted_amount,
        month,
        line_item_id: model.line_item_id.map(LineItemId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
    })
}
