//! Line item routes: CRUD, monthly upsert, recalculation and variance.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use budgetrack_core::budget::{
    LineItem, LineItemDetail, LineItemFilter, MonthlyBudgetAggregator, NewLineItem,
    VarianceCalculator, VarianceReport,
};
use budgetrack_db::LineItemRepository;
use budgetrack_shared::types::LineItemId;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{AppJson, AppPath, AppQuery};

/// Creates the line item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/line-items", get(list_line_items).post(create_line_item))
        .route("/line-items/{id}", get(get_line_item))
        .route("/line-items/{id}/months", put(upsert_months))
        .route("/line-items/{id}/recalculate", post(recalculate))
        .route("/line-items/{id}/variance", get(variance))
}

/// Request body for the bulk monthly upsert.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDataRequest {
    /// Month label to amount; non-numeric amounts count as zero.
    pub monthly_data: Map<String, Value>,
}

/// Response for operations that change a line item's total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalBudgetResponse {
    /// Always true; failures are reported as errors.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Total budget after the operation.
    pub total_budget: Decimal,
}

fn repository(state: &AppState) -> Arc<LineItemRepository> {
    Arc::new(LineItemRepository::new((*state.db).clone()))
}

/// GET `/line-items`
async fn list_line_items(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<LineItemFilter>,
) -> ApiResult<Json<Vec<LineItem>>> {
    Ok(Json(repository(&state).list_line_items(&filter).await?))
}

/// POST `/line-items`
async fn create_line_item(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewLineItem>,
) -> ApiResult<(StatusCode, Json<LineItem>)> {
    let item = repository(&state).create_line_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET `/line-items/{id}`
async fn get_line_item(
    State(state): State<AppState>,
    AppPath(id): AppPath<LineItemId>,
) -> ApiResult<Json<LineItemDetail>> {
    Ok(Json(repository(&state).get_line_item_detail(id).await?))
}

/// PUT `/line-items/{id}/months`
async fn upsert_months(
    State(state): State<AppState>,
    AppPath(id): AppPath<LineItemId>,
    AppJson(payload): AppJson<MonthlyDataRequest>,
) -> ApiResult<Json<TotalBudgetResponse>> {
    let aggregator = MonthlyBudgetAggregator::new(repository(&state));
    let total_budget = aggregator
        .upsert_monthly_data(id, &payload.monthly_data)
        .await?;

    info!(line_item_id = %id, months = payload.monthly_data.len(), %total_budget, "Monthly data saved");
    Ok(Json(TotalBudgetResponse {
        success: true,
        message: "Monthly data saved".to_string(),
        total_budget,
    }))
}

/// POST `/line-items/{id}/recalculate`
async fn recalculate(
    State(state): State<AppState>,
    AppPath(id): AppPath<LineItemId>,
) -> ApiResult<Json<TotalBudgetResponse>> {
    let aggregator = MonthlyBudgetAggregator::new(repository(&state));
    let total_budget = aggregator.recalculate_total(id).await?;

    Ok(Json(TotalBudgetResponse {
        success: true,
        message: "Total budget recalculated".to_string(),
        total_budget,
    }))
}

/// GET `/line-items/{id}/variance`
async fn variance(
    State(state): State<AppState>,
    AppPath(id): AppPath<LineItemId>,
) -> ApiResult<Json<VarianceReport>> {
    let calculator = VarianceCalculator::new(repository(&state));
    Ok(Json(calculator.variance(id).await?))
}
