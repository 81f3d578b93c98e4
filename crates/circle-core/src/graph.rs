//! Support graph writes

use std::sync::Arc;
use std::time::Duration;

use circle_db::{SupportRepository, UserRepository};
use circle_types::UserId;

use crate::store::bounded;
use crate::AuthError;

/// Adds and removes directed "supports" edges
pub struct SupportGraph<U: UserRepository + ?Sized, R: SupportRepository + ?Sized> {
    users: Arc<U>,
    supports: Arc<R>,
    store_timeout: Duration,
}

impl<U: UserRepository + ?Sized, R: SupportRepository + ?Sized> SupportGraph<U, R> {
    pub fn new(users: Arc<U>, supports: Arc<R>, store_timeout: Duration) -> Self {
        Self {
            users,
            supports,
            store_timeout,
        }
    }

    /// `supporter` starts supporting `target`. Returns `true` if the edge is new.
    pub async fn support(&self, supporter: UserId, target: UserId) -> Result<bool, AuthError> {
        if supporter == target {
            return Err(AuthError::SelfSupport);
        }

        let exists = bounded(
            self.store_timeout,
            "users.find_by_id",
            self.users.find_by_id(target.0),
        )
        .await?
        .is_some();
        if !exists {
            return Err(AuthError::NotFound);
        }

        let created = bounded(
            self.store_timeout,
            "supports.add",
            self.supports.add(supporter.0, target.0),
        )
        .await?;

        tracing::debug!(%supporter, %target, created, "Support edge added");
        Ok(created)
    }

    /// Remove the edge if present. Returns `true` if it was removed.
    pub async fn unsupport(&self, supporter: UserId, target: UserId) -> Result<bool, AuthError> {
        let removed = bounded(
            self.store_timeout,
            "supports.remove",
            self.supports.remove(supporter.0, target.0),
        )
        .await?;

        tracing::debug!(%supporter, %target, removed, "Support edge removed");
        Ok(removed)
    }

    /// Whether `supporter` currently supports `target`
    pub async fn is_supporting(&self, supporter: UserId, target: UserId) -> Result<bool, AuthError> {
        bounded(
            self.store_timeout,
            "supports.exists",
            self.supports.exists(supporter.0, target.0),
        )
        .await
    }
}
