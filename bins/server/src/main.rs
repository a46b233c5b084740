//! Budgetrack API Server
//!
//! Main entry point for the Budgetrack backend service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use budgetrack_api::{AppState, RouterLimits, create_router};
use budgetrack_core::ratelimit::FixedWindowRateLimiter;
use budgetrack_db::connect_with;
use budgetrack_shared::config::LogFormat;
use budgetrack_shared::types::CurrencyCode;
use budgetrack_shared::{AppConfig, JwtConfig, JwtService};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "budgetrack=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(config.log.format);

    let db = connect_with(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    });

    let rate_limiter = FixedWindowRateLimiter::new(
        config.rate_limit.max_requests,
        Duration::from_secs(config.rate_limit.window_secs),
    );
    info!(
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        trust_forwarded_for = config.rate_limit.trust_forwarded_for,
        "Rate limiter configured"
    );

    let base_currency = CurrencyCode::parse(&config.currency.base)
        .map_err(anyhow::Error::msg)
        .context("Invalid base currency")?;

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        rate_limiter: Arc::new(rate_limiter),
        trust_forwarded_for: config.rate_limit.trust_forwarded_for,
        base_currency,
    };

    let app = create_router(
        state,
        RouterLimits {
            request_timeout: config.server.request_timeout(),
            max_body_bytes: config.server.max_upload_bytes,
        },
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
