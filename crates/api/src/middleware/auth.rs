//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use budgetrack_shared::types::UserId;
use budgetrack_shared::{AppError, Claims, JwtError};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Validates the bearer token and stores its claims in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError(AppError::Unauthorized(
            "Authorization header with Bearer token is required".to_string(),
        ))
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            let message = match e {
                JwtError::Expired => "Token has expired",
                _ => "Invalid or malformed token",
            };
            ApiError(AppError::Unauthorized(message.to_string())).into_response()
        }
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the acting user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.0.user_id())
    }

    /// Returns the inner claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Authentication required".to_string())))
    }
}
