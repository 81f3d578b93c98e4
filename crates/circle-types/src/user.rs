//! User types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TypeError;

/// Unique user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from a string
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TypeError::InvalidUserId(s.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// How a login request names the account it wants.
///
/// Usernames are stored lower-cased, so the selector normalizes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginSelector {
    Username(String),
    Email(String),
    /// Both fields given: match the username first, then the email
    Either { username: String, email: String },
}

impl LoginSelector {
    /// Build a selector from optional form fields. With both present,
    /// either may match.
    pub fn from_parts(username: Option<&str>, email: Option<&str>) -> Result<Self, TypeError> {
        let username = username.map(str::trim).filter(|s| !s.is_empty());
        let email = email.map(str::trim).filter(|s| !s.is_empty());

        match (username, email) {
            (Some(u), Some(e)) => Ok(Self::Either {
                username: u.to_lowercase(),
                email: e.to_string(),
            }),
            (Some(u), None) => Ok(Self::Username(u.to_lowercase())),
            (None, Some(e)) => Ok(Self::Email(e.to_string())),
            (None, None) => Err(TypeError::MissingSelector),
        }
    }
}

/// User fields safe to return to clients (no password digest)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub home_town: String,
    pub dp: String,
    pub cover_pic: String,
    pub created_at: DateTime<Utc>,
}
