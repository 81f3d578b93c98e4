//! Configuration types for the core services

use std::time::Duration;

use crate::crypto::SigningKey;
use crate::AuthError;

/// Token signing configuration
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret for access tokens
    pub access_secret: String,
    /// HMAC secret for refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Create a token config, rejecting secrets shorter than 32 bytes
    pub fn try_new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let access_secret = access_secret.into();
        let refresh_secret = refresh_secret.into();

        for (name, secret) in [("access", &access_secret), ("refresh", &refresh_secret)] {
            if secret.len() < SigningKey::MIN_KEY_LENGTH {
                return Err(AuthError::Configuration(format!(
                    "{name} token secret must be at least {} bytes",
                    SigningKey::MIN_KEY_LENGTH
                )));
            }
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl: Duration::from_secs(15 * 60),        // 15 minutes
            refresh_ttl: Duration::from_secs(10 * 24 * 60 * 60), // 10 days
        })
    }

    /// Set access token lifetime
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Set refresh token lifetime
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// Core service configuration
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub token: TokenConfig,
    /// Upper bound on any single store call
    pub store_timeout: Duration,
}

impl CoreConfig {
    pub fn new(token: TokenConfig) -> Self {
        Self {
            token,
            store_timeout: Duration::from_secs(5),
        }
    }

    /// Set store call timeout
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}
