//! Storage capabilities needed by the actuals services.

use std::future::Future;

use budgetrack_shared::types::{ActualId, LineItemId, PageRequest, PageResponse};

use super::error::ActualsError;
use super::types::{Actual, ActualFilter, NewActual};
use crate::fiscal::Month;

/// Repository trait for actuals.
pub trait ActualStore: Send + Sync {
    /// Find an actual by ID.
    fn find_actual(
        &self,
        id: ActualId,
    ) -> impl Future<Output = Result<Option<Actual>, ActualsError>> + Send;

    /// Returns true if the line item exists.
    fn line_item_exists(
        &self,
        id: LineItemId,
    ) -> impl Future<Output = Result<bool, ActualsError>> + Send;

    /// Store the line item and month on an actual.
    fn apply_to_line_item(
        &self,
        actual_id: ActualId,
        line_item_id: LineItemId,
        month: Month,
    ) -> impl Future<Output = Result<Actual, ActualsError>> + Send;

    /// Insert a batch of actuals. Either every row is written or none.
    fn insert_actuals(
        &self,
        actuals: Vec<NewActual>,
    ) -> impl Future<Output = Result<Vec<Actual>, ActualsError>> + Send;

    /// List actuals, newest first.
    fn list_actuals(
        &self,
        filter: &ActualFilter,
        page: &PageRequest,
    ) -> impl Future<Output = Result<PageResponse<Actual>, ActualsError>> + Send;
}
