//! Budget spreadsheet export and import.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info};

use budgetrack_core::fiscal::FiscalYear;
use budgetrack_core::spreadsheet::{
    BudgetImportOutcome, BudgetImporter, ExportTemplate, parse_budget_csv, render_budget_csv,
};
use budgetrack_db::LineItemRepository;
use budgetrack_shared::AppError;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppQuery, CsvUpload, DryRunQuery};

/// Creates the budget spreadsheet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets/export", get(export_budgets))
        .route("/budgets/import", post(import_budgets))
}

/// Query parameters for the export.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// `upload` (default) or `report`.
    pub template: Option<String>,
    /// Fiscal year, e.g. `FY2026`, `2026` or `2025-26`.
    pub fy: Option<String>,
}

/// GET `/budgets/export?template=&fy=`
async fn export_budgets(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ExportQuery>,
) -> ApiResult<impl IntoResponse> {
    let template = match query.template.as_deref() {
        None | Some("") => ExportTemplate::default(),
        Some(raw) => ExportTemplate::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown template: {raw}")))?,
    };
    let fiscal_year = match query.fy.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            FiscalYear::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid fiscal year: {raw}")))?,
        ),
    };

    let rows = LineItemRepository::new((*state.db).clone())
        .list_export_rows(fiscal_year)
        .await?;
    let body = render_budget_csv(template, &rows).map_err(|e| {
        error!(error = %e, "Failed to render budget export");
        ApiError(AppError::Internal(e.to_string()))
    })?;

    info!(?template, rows = rows.len(), "Budget export generated");
    let disposition = format!(
        "attachment; filename=\"{}\"",
        template.file_name(fiscal_year)
    );
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// POST `/budgets/import?dryRun=`
async fn import_budgets(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DryRunQuery>,
    upload: CsvUpload,
) -> ApiResult<Json<BudgetImportOutcome>> {
    let rows = parse_budget_csv(&upload.bytes)?;
    info!(rows = rows.len(), dry_run = query.dry_run, "Importing budget sheet");

    let importer = BudgetImporter::new(Arc::new(LineItemRepository::new((*state.db).clone())));
    Ok(Json(importer.import(rows, query.dry_run).await?))
}
