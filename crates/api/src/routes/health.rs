//! Liveness check.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Liveness payload. The route answers 200 even when the database is
/// unreachable so that load balancers can tell the process is up.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// `healthy` when the database answers a ping, `degraded` otherwise.
    pub status: &'static str,
    /// Whether the database ping succeeded.
    pub database: bool,
    /// Crate version.
    pub version: &'static str,
    /// Common currency used for conversions.
    pub base_currency: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "database ping failed");
            false
        }
    };

    Json(HealthStatus {
        status: if database { "healthy" } else { "degraded" },
        database,
        version: env!("CARGO_PKG_VERSION"),
        base_currency: state.base_currency.to_string(),
    })
}

/// Creates the health route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
