//! Profile aggregation

use std::sync::Arc;
use std::time::Duration;

use circle_db::{SupportRepository, UserRepository};
use circle_types::{ProfileView, UserId};

use crate::store::bounded;
use crate::AuthError;

/// Builds profile views: both counts of the viewed user plus the viewer flag
pub struct ProfileAggregator<U: UserRepository + ?Sized, R: SupportRepository + ?Sized> {
    users: Arc<U>,
    supports: Arc<R>,
    store_timeout: Duration,
}

impl<U: UserRepository + ?Sized, R: SupportRepository + ?Sized> ProfileAggregator<U, R> {
    pub fn new(users: Arc<U>, supports: Arc<R>, store_timeout: Duration) -> Self {
        Self {
            users,
            supports,
            store_timeout,
        }
    }

    /// Aggregate the profile of `target` as seen by `viewer`.
    ///
    /// The counts and the viewer flag come from a single store call, so they
    /// always describe the same moment.
    pub async fn build_profile_view(
        &self,
        target: UserId,
        viewer: Option<UserId>,
    ) -> Result<ProfileView, AuthError> {
        let row = bounded(
            self.store_timeout,
            "supports.profile_view",
            self.supports.profile_view(target.0, viewer.map(|v| v.0)),
        )
        .await?
        .ok_or(AuthError::NotFound)?;

        Ok(row.into())
    }

    /// Resolve `username` (case-insensitive) and aggregate its profile
    pub async fn profile_by_username(
        &self,
        username: &str,
        viewer: Option<UserId>,
    ) -> Result<ProfileView, AuthError> {
        let target = self.resolve(username).await?;
        self.build_profile_view(target, viewer).await
    }

    /// Resolve a username to an identity
    pub async fn resolve(&self, username: &str) -> Result<UserId, AuthError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(AuthError::NotFound);
        }
        bounded(
            self.store_timeout,
            "users.find_by_username",
            self.users.find_by_username(&username),
        )
        .await?
        .map(|u| u.user_id())
        .ok_or(AuthError::NotFound)
    }
}
