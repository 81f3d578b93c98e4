//! Common error types

use thiserror::Error;

/// Errors raised while building domain values from untrusted input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Neither a username nor an email was supplied
    #[error("username or email is required")]
    MissingSelector,

    /// A string could not be parsed as a user ID
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    /// A token kind string was not recognized
    #[error("unknown token kind: {0}")]
    UnknownTokenKind(String),
}
