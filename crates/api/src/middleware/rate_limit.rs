//! Per-client request throttling.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use budgetrack_core::ratelimit::RateDecision;
use budgetrack_shared::AppError;

use crate::AppState;
use crate::error::ApiError;

/// Key used when no client address is known.
const UNKNOWN_CLIENT: &str = "unknown";

/// Identifies the calling client by its peer address.
///
/// The first `X-Forwarded-For` hop is used instead only when
/// `trust_forwarded_for` is set, i.e. when every request arrives through a
/// proxy that overwrites the header.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    let forwarded = trust_forwarded_for
        .then(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        })
        .flatten();

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Rejects requests over the configured rate with 429 and `Retry-After`.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, state.trust_forwarded_for);

    match state.rate_limiter.check(&key) {
        RateDecision::Allow => next.run(request).await,
        RateDecision::Deny { retry_after } => {
            let retry_after_secs = retry_after.as_secs().max(1);
            warn!(client = %key, retry_after_secs, "Rate limit exceeded");
            ApiError(AppError::RateLimited { retry_after_secs }).into_response()
        }
    }
}
