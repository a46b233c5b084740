//! Error responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header::RETRY_AFTER};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use budgetrack_core::actuals::ActualsError;
use budgetrack_core::budget::BudgetError;
use budgetrack_core::currency::CurrencyError;
use budgetrack_core::purchase_order::PurchaseOrderError;
use budgetrack_shared::AppError;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    /// Shorthand for a 400 response.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &err {
            AppError::Database(_) | AppError::Internal(_) => {
                error!(error = %err, "Request failed");
                "An internal error occurred".to_string()
            }
            AppError::ExternalService(_) => {
                error!(error = %err, "Dependency unavailable");
                err.to_string()
            }
            _ => err.to_string(),
        };

        let body = Json(ErrorBody {
            error: err.error_code(),
            message,
        });

        let mut response = (status, body).into_response();
        if let AppError::RateLimited { retry_after_secs } = err {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        Self(err.into())
    }
}

impl From<ActualsError> for ApiError {
    fn from(err: ActualsError) -> Self {
        Self(err.into())
    }
}

impl From<CurrencyError> for ApiError {
    fn from(err: CurrencyError) -> Self {
        Self(err.into())
    }
}

impl From<PurchaseOrderError> for ApiError {
    fn from(err: PurchaseOrderError) -> Self {
        Self(err.into())
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_renders_code_and_message() {
        let response = ApiError::bad_request("amount is required").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "Validation error: amount is required");
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError(AppError::RateLimited {
            retry_after_secs: 12,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "12");
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let response = ApiError(AppError::Database("connection refused".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "DATABASE_ERROR");
        assert_eq!(json["message"], "An internal error occurred");
    }
}
