//! Configuration for the Circle API service.

use std::time::Duration;

use circle_core::{CoreConfig, TokenConfig};

/// Circle API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL. The in-memory backend is used when absent.
    pub database_url: Option<String>,

    /// Core service configuration
    pub core: CoreConfig,

    /// Whole-request timeout
    pub request_timeout: Duration,

    /// Mark auth cookies `Secure`
    pub cookie_secure: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup, for tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        // Server
        let http_port = parse_or(&lookup, "HTTP_PORT", 8080u16)?;
        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let cookie_secure = parse_or(&lookup, "COOKIE_SECURE", true)?;

        // Token secrets (minimum 32 bytes each)
        let access_secret =
            lookup("ACCESS_TOKEN_SECRET").ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;
        let refresh_secret =
            lookup("REFRESH_TOKEN_SECRET").ok_or(ConfigError::Missing("REFRESH_TOKEN_SECRET"))?;

        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ",
            ));
        }

        // Lifetimes (defaults: 15 minutes / 10 days)
        let access_ttl_secs: u64 = parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", 15 * 60)?;
        let refresh_ttl_secs: u64 = parse_or(&lookup, "REFRESH_TOKEN_TTL_SECS", 10 * 24 * 3600)?;
        let store_timeout_ms: u64 = parse_or(&lookup, "STORE_TIMEOUT_MS", 5_000)?;

        let token = TokenConfig::try_new(access_secret, refresh_secret)
            .map_err(|e| ConfigError::Core(e.to_string()))?
            .with_access_ttl(Duration::from_secs(access_ttl_secs))
            .with_refresh_ttl(Duration::from_secs(refresh_ttl_secs));

        let core =
            CoreConfig::new(token).with_store_timeout(Duration::from_millis(store_timeout_ms));

        Ok(Self {
            http_port,
            database_url,
            core,
            request_timeout: Duration::from_secs(request_timeout_secs),
            cookie_secure,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Core config error: {0}")]
    Core(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn secrets() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ACCESS_TOKEN_SECRET", "access-secret-access-secret-access"),
            ("REFRESH_TOKEN_SECRET", "refresh-secret-refresh-secret-refresh"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&secrets())).unwrap();
        assert_eq!(config.http_port, 8080);
        assert!(config.database_url.is_none());
        assert!(config.cookie_secure);
        assert_eq!(config.core.token.access_ttl, Duration::from_secs(900));
        assert_eq!(config.core.token.refresh_ttl, Duration::from_secs(864_000));
        assert_eq!(config.core.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = secrets();
        pairs.extend([
            ("HTTP_PORT", "9090"),
            ("DATABASE_URL", "postgres://localhost/circle"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("STORE_TIMEOUT_MS", "250"),
            ("COOKIE_SECURE", "false"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/circle"));
        assert_eq!(config.core.token.access_ttl, Duration::from_secs(60));
        assert_eq!(config.core.store_timeout, Duration::from_millis(250));
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_missing_secret() {
        let result = Config::from_lookup(lookup(&[("ACCESS_TOKEN_SECRET", "x".repeat(40).as_str())]));
        assert!(matches!(result, Err(ConfigError::Missing("REFRESH_TOKEN_SECRET"))));
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = secrets();
        pairs.push(("HTTP_PORT", "not-a-port"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid("HTTP_PORT"))
        ));

        let short = [("ACCESS_TOKEN_SECRET", "short"), ("REFRESH_TOKEN_SECRET", "also-short")];
        assert!(matches!(
            Config::from_lookup(lookup(&short)),
            Err(ConfigError::Core(_))
        ));

        let same = [
            ("ACCESS_TOKEN_SECRET", "same-secret-same-secret-same-secret"),
            ("REFRESH_TOKEN_SECRET", "same-secret-same-secret-same-secret"),
        ];
        assert!(matches!(
            Config::from_lookup(lookup(&same)),
            Err(ConfigError::Invalid(_))
        ));
    }
}
