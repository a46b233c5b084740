//! Applies actuals to line items.

use std::sync::Arc;

use tracing::info;

use budgetrack_shared::types::{ActualId, LineItemId};

use super::error::ActualsError;
use super::store::ActualStore;
use super::types::Actual;
use crate::fiscal::Month;

/// Associates actual expenditure records with line items.
///
/// Applying an actual does not touch the line item's total budget.
pub struct ActualsApplier<S: ActualStore> {
    store: Arc<S>,
}

impl<S: ActualStore> ActualsApplier<S> {
    /// Creates a new applier.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Applies an actual to a line item, deriving its month from the invoice date.
    pub async fn apply(
        &self,
        actual_id: ActualId,
        line_item_id: Option<LineItemId>,
    ) -> Result<Actual, ActualsError> {
        let line_item_id = line_item_id.ok_or(ActualsError::MissingLineItem)?;

        let actual = self
            .store
            .find_actual(actual_id)
            .await?
            .ok_or(ActualsError::ActualNotFound(actual_id))?;

        let invoice_date = actual
            .invoice_date
            .ok_or(ActualsError::MissingInvoiceDate(actual_id))?;

        if !self.store.line_item_exists(line_item_id).await? {
            return Err(ActualsError::LineItemNotFound(line_item_id));
        }

        let month = Month::from_date(invoice_date);
        let applied = self
            .store
            .apply_to_line_item(actual_id, line_item_id, month)
            .await?;

        info!(%actual_id, %line_item_id, %month, "Applied actual to line item");
        Ok(applied)
    }
}
