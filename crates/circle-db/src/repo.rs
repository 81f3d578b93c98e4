//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
///
/// Account CRUD beyond what the session core needs lives elsewhere; this
/// covers credential lookup and the password-change write.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by (lower-cased) username
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user, failing with `Conflict` on a taken username or email
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Replace the stored password digest
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

/// Session slot repository trait
///
/// Every method is a single store operation, so an abandoned request can
/// never leave a slot half-written.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load the slot for a user
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<SessionSlotRow>>;

    /// Overwrite the slot unconditionally (login)
    async fn replace(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<()>;

    /// Replace the slot value only if it currently equals `expected_hash`.
    ///
    /// Returns `true` if this call performed the swap.
    async fn compare_and_swap(
        &self,
        user_id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<bool>;

    /// Empty the slot (logout). Idempotent.
    async fn clear(&self, user_id: Uuid) -> DbResult<()>;
}

/// Support edge repository trait
#[async_trait]
pub trait SupportRepository: Send + Sync {
    /// Insert the edge if absent; `true` if it was created
    async fn add(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool>;

    /// Delete the edge if present; `true` if it was removed
    async fn remove(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool>;

    /// Number of users supporting `user_id`
    async fn count_supporters(&self, user_id: Uuid) -> DbResult<u64>;

    /// Number of users `user_id` supports
    async fn count_supporting(&self, user_id: Uuid) -> DbResult<u64>;

    /// Whether `supporter` supports `supporting`
    async fn exists(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool>;

    /// Both counts and the viewer flag for `target`, read from one snapshot.
    ///
    /// Returns `None` when `target` is not a user.
    async fn profile_view(&self, target: Uuid, viewer: Option<Uuid>)
        -> DbResult<Option<ProfileRow>>;
}
