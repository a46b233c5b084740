//! Actuals routes: listing, applying to line items and spreadsheet import.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use budgetrack_core::actuals::{
    Actual, ActualFilter, ActualStore, ActualsApplier, ActualsImporter, ImportOutcome,
    parse_actuals_csv,
};
use budgetrack_core::fiscal::Month;
use budgetrack_db::{ActualRepository, CurrencyRateRepository};
use budgetrack_shared::types::{ActualId, LineItemId, PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{AppJson, AppPath, AppQuery, CsvUpload, DryRunQuery};

/// Creates the actuals routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/actuals", get(list_actuals))
        .route("/actuals/import", post(import_actuals))
        .route("/actuals/{id}/apply", post(apply_actual))
}

/// Query parameters for listing actuals.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActualsQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
    /// Only actuals applied to this line item.
    pub line_item_id: Option<LineItemId>,
    /// Only actuals in this month.
    pub month: Option<Month>,
    /// Only actuals not yet applied.
    #[serde(default)]
    pub unapplied: bool,
}

/// Request body for applying an actual.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyActualRequest {
    /// Target line item.
    pub line_item_id: Option<LineItemId>,
}

/// GET `/actuals`
async fn list_actuals(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListActualsQuery>,
) -> ApiResult<Json<PageResponse<Actual>>> {
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.limit.unwrap_or(defaults.limit),
    );
    let filter = ActualFilter {
        line_item_id: query.line_item_id,
        month: query.month,
        unapplied_only: query.unapplied,
    };

    let repo = ActualRepository::new((*state.db).clone());
    Ok(Json(repo.list_actuals(&filter, &page).await?))
}

/// POST `/actuals/{id}/apply`
async fn apply_actual(
    State(state): State<AppState>,
    AppPath(id): AppPath<ActualId>,
    AppJson(payload): AppJson<ApplyActualRequest>,
) -> ApiResult<Json<Actual>> {
    let applier = ActualsApplier::new(Arc::new(ActualRepository::new((*state.db).clone())));
    Ok(Json(applier.apply(id, payload.line_item_id).await?))
}

/// POST `/actuals/import?dryRun=`
async fn import_actuals(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DryRunQuery>,
    upload: CsvUpload,
) -> ApiResult<Json<ImportOutcome>> {
    let rows = parse_actuals_csv(&upload.bytes)?;
    info!(
        file = upload.file_name.as_deref().unwrap_or("-"),
        rows = rows.len(),
        dry_run = query.dry_run,
        "Importing actuals"
    );

    let importer = ActualsImporter::new(
        Arc::new(ActualRepository::new((*state.db).clone())),
        Arc::new(CurrencyRateRepository::new((*state.db).clone())),
        state.base_currency.clone(),
    );
    Ok(Json(importer.import(rows, query.dry_run).await?))
}
