//! Audit trail query.

use axum::{Json, Router, extract::State, routing::get};

use budgetrack_core::audit::{AuditEntry, AuditFilter};
use budgetrack_db::AuditLogRepository;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::AppQuery;

/// Creates the audit log routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit-logs", get(list_audit_logs))
}

/// GET `/audit-logs?entityType=&entityId=`
async fn list_audit_logs(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<AuditFilter>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    let repo = AuditLogRepository::new((*state.db).clone());
    Ok(Json(repo.list(&filter).await?))
}
