//! In-memory session slot repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::SessionSlotRow;
use crate::repo::SessionRepository;

/// In-memory session slot repository.
///
/// `compare_and_swap` holds the shard write lock for the user's key while it
/// compares and writes, which gives the same one-winner guarantee as the
/// conditional UPDATE in PostgreSQL.
#[derive(Default, Clone)]
pub struct MemorySessionRepository {
    slots: Arc<DashMap<Uuid, SessionSlotRow>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<SessionSlotRow>> {
        Ok(self.slots.get(&user_id).map(|r| r.value().clone()))
    }

    async fn replace(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<()> {
        self.slots.insert(
            user_id,
            SessionSlotRow {
                user_id,
                refresh_token_hash: Some(token_hash.to_string()),
                expires_at: Some(expires_at),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        user_id: Uuid,
        expected_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let Some(mut slot) = self.slots.get_mut(&user_id) else {
            return Ok(false);
        };
        if slot.refresh_token_hash.as_deref() != Some(expected_hash) {
            return Ok(false);
        }
        slot.refresh_token_hash = Some(new_hash.to_string());
        slot.expires_at = Some(expires_at);
        slot.updated_at = Utc::now();
        Ok(true)
    }

    async fn clear(&self, user_id: Uuid) -> DbResult<()> {
        if let Some(mut slot) = self.slots.get_mut(&user_id) {
            slot.refresh_token_hash = None;
            slot.expires_at = None;
            slot.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn later() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::days(1)
    }

    #[tokio::test]
    async fn test_replace_overwrites() {
        let repo = MemorySessionRepository::new();
        let user = Uuid::new_v4();

        repo.replace(user, "first", later()).await.unwrap();
        repo.replace(user, "second", later()).await.unwrap();

        let slot = repo.find_by_user_id(user).await.unwrap().unwrap();
        assert_eq!(slot.refresh_token_hash.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let repo = MemorySessionRepository::new();
        let user = Uuid::new_v4();

        // No slot yet
        assert!(!repo.compare_and_swap(user, "a", "b", later()).await.unwrap());

        repo.replace(user, "a", later()).await.unwrap();
        assert!(!repo.compare_and_swap(user, "stale", "b", later()).await.unwrap());
        assert!(repo.compare_and_swap(user, "a", "b", later()).await.unwrap());
        // The old value no longer matches
        assert!(!repo.compare_and_swap(user, "a", "c", later()).await.unwrap());

        let slot = repo.find_by_user_id(user).await.unwrap().unwrap();
        assert_eq!(slot.refresh_token_hash.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let repo = MemorySessionRepository::new();
        let user = Uuid::new_v4();

        repo.clear(user).await.unwrap();
        repo.replace(user, "a", later()).await.unwrap();
        repo.clear(user).await.unwrap();
        repo.clear(user).await.unwrap();

        let slot = repo.find_by_user_id(user).await.unwrap().unwrap();
        assert!(slot.refresh_token_hash.is_none());
        assert!(!repo.compare_and_swap(user, "a", "b", later()).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_swaps_have_one_winner() {
        let repo = MemorySessionRepository::new();
        let user = Uuid::new_v4();
        repo.replace(user, "start", later()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.compare_and_swap(user, "start", &format!("next-{i}"), later())
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
