//! Purchase order routes.

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use budgetrack_core::purchase_order::{
    CreatePurchaseOrder, PoStatus, PurchaseOrder, PurchaseOrderFilter, PurchaseOrderService,
    UpdatePurchaseOrder,
};
use budgetrack_db::PurchaseOrderRepository;
use budgetrack_shared::types::{PageRequest, PageResponse, PurchaseOrderId};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppJson, AppPath, AppQuery};
use crate::middleware::AuthUser;

/// Creates the purchase order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/purchase-orders",
            get(list_purchase_orders).post(create_purchase_order),
        )
        .route(
            "/purchase-orders/{id}",
            get(get_purchase_order).put(update_purchase_order),
        )
}

/// Query parameters for listing purchase orders.
#[derive(Debug, Deserialize)]
pub struct ListPurchaseOrdersQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 100).
    pub limit: Option<u32>,
    /// Substring of the PO or PR number.
    pub search: Option<String>,
    /// Status name.
    pub status: Option<String>,
    /// Exact vendor name.
    pub vendor: Option<String>,
}

fn service(state: &AppState) -> PurchaseOrderService<PurchaseOrderRepository> {
    PurchaseOrderService::new(Arc::new(PurchaseOrderRepository::new((*state.db).clone())))
}

/// GET `/purchase-orders`
async fn list_purchase_orders(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListPurchaseOrdersQuery>,
) -> ApiResult<Json<PageResponse<PurchaseOrder>>> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            PoStatus::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Unknown status: {raw}")))?,
        ),
    };
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.limit.unwrap_or(defaults.limit),
    );
    let filter = PurchaseOrderFilter {
        search: query.search,
        status,
        vendor: query.vendor.filter(|v| !v.is_empty()),
    };

    Ok(Json(service(&state).list(&filter, &page).await?))
}

/// POST `/purchase-orders`
async fn create_purchase_order(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<CreatePurchaseOrder>,
) -> ApiResult<(StatusCode, Json<PurchaseOrder>)> {
    let po = service(&state).create(payload, auth.user_id()).await?;
    Ok((StatusCode::CREATED, Json(po)))
}

/// GET `/purchase-orders/{id}`
async fn get_purchase_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<PurchaseOrderId>,
) -> ApiResult<Json<PurchaseOrder>> {
    Ok(Json(service(&state).get(id).await?))
}

/// PUT `/purchase-orders/{id}`
async fn update_purchase_order(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<PurchaseOrderId>,
    AppJson(payload): AppJson<UpdatePurchaseOrder>,
) -> ApiResult<Json<PurchaseOrder>> {
    Ok(Json(service(&state).update(id, payload, auth.user_id()).await?))
}
