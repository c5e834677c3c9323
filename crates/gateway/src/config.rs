//! Gateway configuration.
//!
//! Host and port come from the `serve` command line (which also reads
//! `GATEWAY_HOST`/`GATEWAY_PORT`); everything else is read here.

use auth_service_lib::config::AuthServiceConfig;
use common::{process_env, ConfigError, DatabaseConfig, RateLimitConfig};

/// Everything the gateway process needs to boot.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Redis URL for rate limiting counters
    pub redis_url: String,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
    pub auth: AuthServiceConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            redis_url: process_env("REDIS_URL")
                .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            database: DatabaseConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            auth: AuthServiceConfig::from_env()?,
        })
    }
}
