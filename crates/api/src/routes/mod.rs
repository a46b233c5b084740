//! API route definitions.

use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{auth_middleware, rate_limit_middleware};

pub mod actuals;
pub mod audit_logs;
pub mod budgets;
pub mod currency_rates;
pub mod health;
pub mod line_items;
pub mod master_data;
pub mod purchase_orders;

/// Creates the API router; everything except health requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(master_data::routes())
        .merge(line_items::routes())
        .merge(actuals::routes())
        .merge(budgets::routes())
        .merge(purchase_orders::routes())
        .merge(currency_rates::routes())
        .merge(audit_logs::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}
