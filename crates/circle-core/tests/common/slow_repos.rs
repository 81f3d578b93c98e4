//! Repositories that stall, for exercising store timeouts

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use circle_db::memory::MemoryUserRepository;
use circle_db::{CreateUser, DbResult, SessionRepository, SessionSlotRow, UserRepository, UserRow};
use uuid::Uuid;

/// Session repository whose every call sleeps past any sane timeout
#[derive(Debug, Clone)]
pub struct SlowSessionRepository {
    pub delay: Duration,
}

impl SlowSessionRepository {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SessionRepository for SlowSessionRepository {
    async fn find_by_user_id(&self, _user_id: Uuid) -> DbResult<Option<SessionSlotRow>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn replace(
        &self,
        _user_id: Uuid,
        _token_hash: &str,
        _expires_at: DateTime<Utc>,
    ) -> DbResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        _user_id: Uuid,
        _expected_hash: &str,
        _new_hash: &str,
        _expires_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        tokio::time::sleep(self.delay).await;
        Ok(false)
    }

    async fn clear(&self, _user_id: Uuid) -> DbResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// User repository whose lookups by ID stall while name and email lookups
/// pass through
#[derive(Clone)]
pub struct StallingByIdUserRepository {
    pub inner: MemoryUserRepository,
    pub delay: Duration,
}

impl StallingByIdUserRepository {
    pub fn new(inner: MemoryUserRepository, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl UserRepository for StallingByIdUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.inner.find_by_username(username).await
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        self.inner.find_by_email(email).await
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        self.inner.create(user).await
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        self.inner.update_password_hash(id, password_hash).await
    }
}
