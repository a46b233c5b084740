//! Application configuration management.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Per-client request throttling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Log output configuration.
    #[serde(default)]
    pub log: LogConfig,
    /// Currency settings.
    #[serde(default)]
    pub currency: CurrencyConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline applied to every request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Largest accepted upload body.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl ServerConfig {
    /// Returns the per-request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings. Tokens are issued by the identity provider; this
/// service only validates them.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds (used when minting test tokens).
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Rate limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Key clients by the first `X-Forwarded-For` hop. Enable only behind a
    /// proxy that overwrites the header; otherwise the peer address is used.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_max_requests() -> u32 {
    300
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trust_forwarded_for: false,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Currency configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Common currency that imported actuals are converted into.
    #[serde(default = "default_base_currency")]
    pub base: String,
}

fn default_base_currency() -> String {
    "INR".to_string()
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            base: default_base_currency(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BUDGETRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("BUDGETRACK__DATABASE__URL", Some("postgres://localhost/bt")),
                ("BUDGETRACK__JWT__SECRET", Some("secret")),
                ("BUDGETRACK__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/bt");
                assert_eq!(config.jwt.secret, "secret");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
                assert_eq!(config.rate_limit.max_requests, 300);
                assert_eq!(config.rate_limit.window_secs, 60);
                assert!(!config.rate_limit.trust_forwarded_for);
                assert_eq!(config.log.format, LogFormat::Pretty);
                assert_eq!(config.currency.base, "INR");
            },
        );
    }

    #[test]
    fn test_load_overrides_rate_limit_and_log_format() {
        temp_env::with_vars(
            [
                ("BUDGETRACK__DATABASE__URL", Some("postgres://localhost/bt")),
                ("BUDGETRACK__JWT__SECRET", Some("secret")),
                ("BUDGETRACK__RATE_LIMIT__MAX_REQUESTS", Some("5")),
                ("BUDGETRACK__LOG__FORMAT", Some("json")),
                ("BUDGETRACK__RATE_LIMIT__TRUST_FORWARDED_FOR", Some("true")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.rate_limit.max_requests, 5);
                assert!(config.rate_limit.trust_forwarded_for);
                assert_eq!(config.log.format, LogFormat::Json);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("BUDGETRACK__DATABASE__URL", None::<&str>),
                ("BUDGETRACK__JWT__SECRET", Some("secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
