use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::env;

pub const PRODUCTION_ENV: &str = "production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// HMAC secret used exclusively for access tokens.
    pub access_token_secret: String,
    /// HMAC secret used exclusively for refresh tokens.
    pub refresh_token_secret: String,
    /// Deployment environment name; "production" enables secure cookies.
    pub environment: String,
    /// Base URL of the user-profile service.
    pub user_service_url: String,
    /// Timeout for outbound calls to the user-profile service, in seconds.
    pub upstream_timeout_seconds: u64,
    pub rate_limit_ip_max_requests: u32,
    pub rate_limit_ip_window_seconds: u64,
    pub sweep_interval_seconds: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/identity".to_string());

        // Signing key misconfiguration is fatal: fail at startup, not per request.
        let access_token_secret = require_secret("ACCESS_TOKEN_SECRET")?;
        let refresh_token_secret = require_secret("REFRESH_TOKEN_SECRET")?;
        if access_token_secret == refresh_token_secret {
            return Err(anyhow!(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ"
            ));
        }

        let environment = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| PRODUCTION_ENV.to_string());

        let user_service_url =
            env::var("USER_SERVICE_URL").unwrap_or_else(|_| "http://users:8080".to_string());

        let upstream_timeout_seconds = parse_env("UPSTREAM_TIMEOUT_SECONDS", 5);
        let rate_limit_ip_max_requests = parse_env("RATE_LIMIT_IP_MAX_REQUESTS", 10);
        let rate_limit_ip_window_seconds = parse_env("RATE_LIMIT_IP_WINDOW_SECONDS", 60);
        let sweep_interval_seconds = parse_env("SWEEP_INTERVAL_SECONDS", 300);

        Ok(Config {
            database_url,
            access_token_secret,
            refresh_token_secret,
            environment,
            user_service_url,
            upstream_timeout_seconds,
            rate_limit_ip_max_requests,
            rate_limit_ip_window_seconds,
            sweep_interval_seconds,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION_ENV
    }
}

fn require_secret(name: &str) -> anyhow::Result<String> {
    let value = env::var(name).map_err(|_| anyhow!("{} must be set", name))?;
    if value.trim().is_empty() {
        return Err(anyhow!("{} must not be empty", name));
    }
    Ok(value)
}

fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
