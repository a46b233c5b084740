//! Currency rate routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use budgetrack_core::currency::{Conversion, CurrencyConverter, ExchangeRate};
use budgetrack_db::CurrencyRateRepository;
use budgetrack_shared::types::CurrencyCode;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{AppJson, AppQuery};

/// Creates the currency rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currency-rates", post(upsert_rate))
        .route("/currency-rates/convert", get(convert))
}

/// Query parameters for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Amount in `from`.
    pub amount: Decimal,
    /// Source currency code.
    pub from: CurrencyCode,
    /// Target currency code.
    pub to: CurrencyCode,
    /// Reference date; today when absent.
    pub date: Option<NaiveDate>,
}

fn converter(state: &AppState) -> CurrencyConverter<CurrencyRateRepository> {
    CurrencyConverter::new(Arc::new(CurrencyRateRepository::new((*state.db).clone())))
}

/// GET `/currency-rates/convert`
async fn convert(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ConvertQuery>,
) -> ApiResult<Json<Conversion>> {
    let conversion = converter(&state)
        .convert(query.amount, &query.from, &query.to, query.date)
        .await?;
    Ok(Json(conversion))
}

/// POST `/currency-rates`
async fn upsert_rate(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ExchangeRate>,
) -> ApiResult<(StatusCode, Json<ExchangeRate>)> {
    let rate = converter(&state).upsert_rate(payload).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}
