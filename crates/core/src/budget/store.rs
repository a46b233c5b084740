//! Storage capabilities needed by the budget services.

use std::future::Future;

use rust_decimal::Decimal;

use budgetrack_shared::types::LineItemId;

use super::error::BudgetError;
use super::types::{LineItem, MonthlyAllocation};
use crate::actuals::Actual;
use crate::fiscal::Month;

/// Repository trait for line items and their allocations.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait LineItemStore: Send + Sync {
    /// Find a line item by ID.
    fn find_line_item(
        &self,
        id: LineItemId,
    ) -> impl Future<Output = Result<Option<LineItem>, BudgetError>> + Send;

    /// Find a line item by its business uid.
    fn find_line_item_by_uid(
        &self,
        uid: &str,
    ) -> impl Future<Output = Result<Option<LineItem>, BudgetError>> + Send;

    /// List all monthly allocations of a line item.
    fn list_allocations(
        &self,
        id: LineItemId,
    ) -> impl Future<Output = Result<Vec<MonthlyAllocation>, BudgetError>> + Send;

    /// List the actuals applied to a line item.
    fn list_applied_actuals(
        &self,
        id: LineItemId,
    ) -> impl Future<Output = Result<Vec<Actual>, BudgetError>> + Send;

    /// Upsert (line item, month) allocations and store the recomputed total,
    /// returning it. Allocations and total are written in one transaction that
    /// holds the line item row lock, so concurrent writers cannot leave a stale
    /// total behind. Either everything is written or nothing is.
    fn upsert_allocations(
        &self,
        id: LineItemId,
        entries: &[(Month, Decimal)],
    ) -> impl Future<Output = Result<Decimal, BudgetError>> + Send;

    /// Recompute the total from the stored allocations under the line item
    /// row lock and persist it.
    fn refresh_total(&self, id: LineItemId)
    -> impl Future<Output = Result<Decimal, BudgetError>> + Send;
}
