//! Tower and budget head routes.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use budgetrack_core::budget::{BudgetHead, NewBudgetHead, NewTower, Tower};
use budgetrack_db::MasterDataRepository;
use budgetrack_shared::types::TowerId;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{AppJson, AppQuery};

/// Creates the master data routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/towers", get(list_towers).post(create_tower))
        .route("/budget-heads", get(list_budget_heads).post(create_budget_head))
}

/// Query parameters for listing budget heads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetHeadQuery {
    /// Only heads under this tower.
    pub tower_id: Option<TowerId>,
}

/// GET `/towers`
async fn list_towers(State(state): State<AppState>) -> ApiResult<Json<Vec<Tower>>> {
    let repo = MasterDataRepository::new((*state.db).clone());
    Ok(Json(repo.list_towers().await?))
}

/// POST `/towers`
async fn create_tower(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewTower>,
) -> ApiResult<(StatusCode, Json<Tower>)> {
    let repo = MasterDataRepository::new((*state.db).clone());
    let tower = repo.create_tower(payload).await?;
    Ok((StatusCode::CREATED, Json(tower)))
}

/// GET `/budget-heads`
async fn list_budget_heads(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BudgetHeadQuery>,
) -> ApiResult<Json<Vec<BudgetHead>>> {
    let repo = MasterDataRepository::new((*state.db).clone());
    Ok(Json(repo.list_budget_heads(query.tower_id).await?))
}

/// POST `/budget-heads`
async fn create_budget_head(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewBudgetHead>,
) -> ApiResult<(StatusCode, Json<BudgetHead>)> {
    let repo = MasterDataRepository::new((*state.db).clone());
    let head = repo.create_budget_head(payload).await?;
    Ok((StatusCode::CREATED, Json(head)))
}
