//! Core errors

use circle_db::DbError;
use thiserror::Error;

/// Errors returned by the session lifecycle and support graph
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown identity or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Old password did not match on a password change by a signed-in user
    #[error("invalid old password")]
    InvalidOldPassword,

    /// Malformed, unsigned, expired, wrong-kind or unknown-identity token
    #[error("invalid token")]
    InvalidToken,

    /// A well-formed refresh token that no longer matches the session slot
    #[error("refresh token reuse detected")]
    TokenReuseDetected,

    /// Profile target (or current user) does not exist
    #[error("not found")]
    NotFound,

    /// A user tried to support themselves
    #[error("users cannot support themselves")]
    SelfSupport,

    /// Store timed out or could not be reached; safe to retry
    #[error("service temporarily unavailable")]
    TransientUnavailable,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenReuseDetected => 401,
            Self::NotFound => 404,
            Self::SelfSupport | Self::InvalidOldPassword => 400,
            Self::TransientUnavailable => 503,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidOldPassword => "INVALID_OLD_PASSWORD",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenReuseDetected => "TOKEN_REUSE_DETECTED",
            Self::NotFound => "NOT_FOUND",
            Self::SelfSupport => "SELF_SUPPORT",
            Self::TransientUnavailable => "SERVICE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientUnavailable)
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        if err.is_transient() {
            tracing::warn!("Store unavailable: {}", err);
            return Self::TransientUnavailable;
        }
        match err {
            DbError::NotFound => Self::NotFound,
            other => {
                tracing::error!("Database error: {}", other);
                Self::Database(other.to_string())
            }
        }
    }
}
