//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use circle_types::{ProfileView, PublicUser, UserId};
use sqlx::FromRow;
use uuid::Uuid;

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub home_town: String,
    pub dp: String,
    pub cover_pic: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session slot row: at most one live refresh token per user
#[derive(Debug, Clone, FromRow)]
pub struct SessionSlotRow {
    pub user_id: Uuid,
    /// SHA-256 hex digest of the current refresh token, `None` when logged out
    pub refresh_token_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Directed support edge
#[derive(Debug, Clone, FromRow)]
pub struct SupportRow {
    pub supporter: Uuid,
    pub supporting: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Result of the single-pass profile aggregation
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub dp: String,
    pub cover_pic: String,
    pub supporters_count: i64,
    pub supporting_count: i64,
    pub is_supporter: bool,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Projection without the password digest
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.user_id(),
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            bio: self.bio.clone(),
            home_town: self.home_town.clone(),
            dp: self.dp.clone(),
            cover_pic: self.cover_pic.clone(),
            created_at: self.created_at,
        }
    }
}

impl SessionSlotRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }
}

impl From<ProfileRow> for ProfileView {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: UserId(row.id),
            username: row.username,
            full_name: row.full_name,
            dp: row.dp,
            cover_pic: row.cover_pic,
            // COUNT(*) is never negative
            supporters_count: row.supporters_count.max(0) as u64,
            supporting_count: row.supporting_count.max(0) as u64,
            is_supporter: row.is_supporter,
        }
    }
}
