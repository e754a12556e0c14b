use std::path::PathBuf;
use std::str::FromStr;

use atelier_core::pricing::FALLBACK_INR_PER_USD;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to stop after shutdown starts (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Session token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Endpoint of the AI product-content service.
    pub ai_content_url: String,
    /// Timeout for a single AI generation call in seconds (default: `120`).
    pub ai_request_timeout_secs: u64,
    /// Directory uploaded images are written to (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Public URL prefix uploaded images are served under (default: `/uploads`).
    pub public_upload_base: String,
    /// Lifetime of query cache entries in seconds (default: `60`).
    pub cache_ttl_secs: u64,
    /// Interval between scheduled price refreshes in seconds (default: `1800`).
    pub price_refresh_interval_secs: u64,
    /// FX rate used when converting calculated INR prices to USD (default: `83`).
    pub inr_per_usd: f64,
}

/// Read `name` from the environment, falling back to `default`.
///
/// # Panics
///
/// Panics if the variable is set but does not parse as `T`.
fn env_or<T: FromStr>(name: &str, default: &str) -> T {
    std::env::var(name)
        .unwrap_or_else(|_| default.into())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid {}", std::any::type_name::<T>()))
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                                      |
    /// |-------------------------------|----------------------------------------------|
    /// | `HOST`                        | `0.0.0.0`                                    |
    /// | `PORT`                        | `3000`                                       |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`                      |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                                         |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                                         |
    /// | `AI_CONTENT_URL`              | `http://localhost:8000/generate-content`     |
    /// | `AI_REQUEST_TIMEOUT_SECS`     | `120`                                        |
    /// | `UPLOAD_DIR`                  | `uploads`                                    |
    /// | `PUBLIC_UPLOAD_BASE`          | `/uploads`                                   |
    /// | `CACHE_TTL_SECS`              | `60`                                         |
    /// | `PRICE_REFRESH_INTERVAL_SECS` | `1800`                                       |
    /// | `INR_PER_USD`                 | `83`                                         |
    pub fn from_env() -> Self {
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let inr_per_usd: f64 = env_or("INR_PER_USD", &FALLBACK_INR_PER_USD.to_string());
        assert!(inr_per_usd > 0.0, "INR_PER_USD must be positive");

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", "3000"),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", "30"),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", "30"),
            jwt: JwtConfig::from_env(),
            ai_content_url: std::env::var("AI_CONTENT_URL")
                .unwrap_or_else(|_| "http://localhost:8000/generate-content".into()),
            ai_request_timeout_secs: env_or("AI_REQUEST_TIMEOUT_SECS", "120"),
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            ),
            public_upload_base: std::env::var("PUBLIC_UPLOAD_BASE")
                .unwrap_or_else(|_| "/uploads".into()),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", "60"),
            price_refresh_interval_secs: env_or("PRICE_REFRESH_INTERVAL_SECS", "1800"),
            inr_per_usd,
        }
    }
}
