//! API configuration.

use std::time::Duration;

/// Default login password, matching a fresh deployment before an operator
/// sets PASSWORD.
const DEFAULT_PASSWORD: &str = "68fe2a982d12423ca59b699758684def";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size (uploads are large)
    pub max_body_size: usize,
    /// Login password compared by digest
    pub password: String,
    /// Skip the cookie gate entirely (local development)
    pub disable_auth: bool,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout: Duration::from_secs(60),
            max_body_size: 4 * 1024 * 1024 * 1024, // 4 GiB
            password: DEFAULT_PASSWORD.to_string(),
            disable_auth: false,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            password: std::env::var("PASSWORD").unwrap_or(defaults.password),
            disable_auth: std::env::var("DISABLE_AUTH")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
