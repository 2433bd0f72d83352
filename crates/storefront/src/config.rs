//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 5000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:5000`); `https://` enables secure cookies
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)
//! - `ORDER_STOCK_POLICY` - `reject` or `clamp` (default: reject)
//! - `ORDER_STATUS_TRANSITIONS` - `unrestricted` or `lifecycle` (default: unrestricted)
//! - `ORDER_TOTALS_TOLERANCE` - Allowed rounding difference for submitted totals,
//!   or `off` to store totals unchecked (default: 0.01)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use cheez_core::TransitionPolicy;

use crate::models::StockPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Order placement and status rules
    pub orders: OrderSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Rules applied when orders are placed or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSettings {
    /// What to do when a line exceeds available stock.
    pub stock_policy: StockPolicy,
    /// Which status changes are allowed.
    pub transitions: TransitionPolicy,
    /// Maximum difference between submitted and computed amounts.
    /// `None` stores submitted totals without checking them.
    pub totals_tolerance: Option<Decimal>,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            stock_policy: StockPolicy::Reject,
            transitions: TransitionPolicy::Unrestricted,
            totals_tolerance: Some(Decimal::new(1, 2)),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "5000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:5000");

        let orders = OrderSettings {
            stock_policy: parse_env("ORDER_STOCK_POLICY", "reject")?,
            transitions: parse_env("ORDER_STATUS_TRANSITIONS", "unrestricted")?,
            totals_tolerance: parse_tolerance(&get_env_or_default("ORDER_TOTALS_TOLERANCE", "0.01"))
                .map_err(|e| ConfigError::InvalidEnvVar("ORDER_TOTALS_TOLERANCE".to_owned(), e))?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            orders,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse `ORDER_TOTALS_TOLERANCE`: `off` or a non-negative decimal.
fn parse_tolerance(value: &str) -> Result<Option<Decimal>, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    let tolerance = Decimal::from_str(value).map_err(|e| e.to_string())?;
    if tolerance < Decimal::ZERO {
        return Err("tolerance cannot be negative".to_owned());
    }
    Ok(Some(tolerance))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: base_url.to_string(),
            orders: OrderSettings::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:5000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!config("http://localhost:5000").is_secure());
        assert!(config("https://cheez.pk").is_secure());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug_output = format!("{:?}", config("http://localhost:5000"));
        assert!(!debug_output.contains("postgres://localhost/test"));
    }

    #[test]
    fn test_order_settings_default() {
        let settings = OrderSettings::default();
        assert_eq!(settings.stock_policy, StockPolicy::Reject);
        assert_eq!(settings.transitions, TransitionPolicy::Unrestricted);
        assert_eq!(settings.totals_tolerance, Some(Decimal::new(1, 2)));
    }

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(parse_tolerance("off").unwrap(), None);
        assert_eq!(parse_tolerance(" OFF ").unwrap(), None);
        assert_eq!(parse_tolerance("0.05").unwrap(), Some(Decimal::new(5, 2)));
        assert_eq!(parse_tolerance("0").unwrap(), Some(Decimal::ZERO));
        assert!(parse_tolerance("-1").is_err());
        assert!(parse_tolerance("lots").is_err());
    }
}
