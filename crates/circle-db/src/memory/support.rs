//! In-memory support edge repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::MemoryUserRepository;
use crate::error::DbResult;
use crate::models::{ProfileRow, SupportRow};
use crate::repo::SupportRepository;

/// In-memory support edge repository.
///
/// The edge set sits behind one lock so a profile view reads both counts and
/// the viewer flag from the same state.
#[derive(Clone)]
pub struct MemorySupportRepository {
    edges: Arc<RwLock<HashMap<(Uuid, Uuid), DateTime<Utc>>>>,
    users: MemoryUserRepository,
}

impl MemorySupportRepository {
    pub fn new(users: MemoryUserRepository) -> Self {
        Self {
            edges: Arc::default(),
            users,
        }
    }

    /// Snapshot of all edges, oldest first
    pub async fn edges(&self) -> Vec<SupportRow> {
        let edges = self.edges.read().await;
        let mut rows: Vec<SupportRow> = edges
            .iter()
            .map(|(&(supporter, supporting), &created_at)| SupportRow {
                supporter,
                supporting,
                created_at,
            })
            .collect();
        rows.sort_by_key(|r| r.created_at);
        rows
    }
}

impl Default for MemorySupportRepository {
    fn default() -> Self {
        Self::new(MemoryUserRepository::default())
    }
}

#[async_trait]
impl SupportRepository for MemorySupportRepository {
    async fn add(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool> {
        let mut edges = self.edges.write().await;
        if edges.contains_key(&(supporter, supporting)) {
            return Ok(false);
        }
        edges.insert((supporter, supporting), Utc::now());
        Ok(true)
    }

    async fn remove(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool> {
        let mut edges = self.edges.write().await;
        Ok(edges.remove(&(supporter, supporting)).is_some())
    }

    async fn count_supporters(&self, user_id: Uuid) -> DbResult<u64> {
        let edges = self.edges.read().await;
        Ok(edges.keys().filter(|(_, to)| *to == user_id).count() as u64)
    }

    async fn count_supporting(&self, user_id: Uuid) -> DbResult<u64> {
        let edges = self.edges.read().await;
        Ok(edges.keys().filter(|(from, _)| *from == user_id).count() as u64)
    }

    async fn exists(&self, supporter: Uuid, supporting: Uuid) -> DbResult<bool> {
        let edges = self.edges.read().await;
        Ok(edges.contains_key(&(supporter, supporting)))
    }

    async fn profile_view(
        &self,
        target: Uuid,
        viewer: Option<Uuid>,
    ) -> DbResult<Option<ProfileRow>> {
        let Some(user) = self.users.get(&target) else {
            return Ok(None);
        };

        let edges = self.edges.read().await;
        let (mut supporters, mut supporting) = (0i64, 0i64);
        for (from, to) in edges.keys() {
            if *to == target {
                supporters += 1;
            }
            if *from == target {
                supporting += 1;
            }
        }
        let is_supporter = viewer.is_some_and(|v| edges.contains_key(&(v, target)));

        Ok(Some(ProfileRow {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            dp: user.dp,
            cover_pic: user.cover_pic,
            supporters_count: supporters,
            supporting_count: supporting,
            is_supporter,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{CreateUser, UserRepository};

    async fn user(repo: &MemoryUserRepository, name: &str) -> Uuid {
        repo.create(CreateUser {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            full_name: name.to_string(),
            password_hash: "digest".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let repo = MemorySupportRepository::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(repo.add(a, b).await.unwrap());
        assert!(!repo.add(a, b).await.unwrap());
        assert!(repo.exists(a, b).await.unwrap());
        assert!(!repo.exists(b, a).await.unwrap());
        assert_eq!(repo.count_supporters(b).await.unwrap(), 1);
        assert_eq!(repo.count_supporting(a).await.unwrap(), 1);
        assert_eq!(repo.edges().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_edge() {
        let repo = MemorySupportRepository::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(!repo.remove(a, b).await.unwrap());
        repo.add(a, b).await.unwrap();
        assert!(repo.remove(a, b).await.unwrap());
        assert!(!repo.remove(a, b).await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_view_counts_target() {
        let users = MemoryUserRepository::new();
        let repo = MemorySupportRepository::new(users.clone());
        let u1 = user(&users, "u1").await;
        let u2 = user(&users, "u2").await;
        let u3 = user(&users, "u3").await;

        repo.add(u1, u2).await.unwrap();
        repo.add(u1, u3).await.unwrap();

        let view = repo.profile_view(u2, Some(u1)).await.unwrap().unwrap();
        assert_eq!(view.supporters_count, 1);
        assert_eq!(view.supporting_count, 0);
        assert!(view.is_supporter);

        let view = repo.profile_view(u1, Some(u2)).await.unwrap().unwrap();
        assert_eq!(view.supporters_count, 0);
        assert_eq!(view.supporting_count, 2);
        assert!(!view.is_supporter);

        let anonymous = repo.profile_view(u2, None).await.unwrap().unwrap();
        assert!(!anonymous.is_supporter);

        assert!(repo.profile_view(Uuid::new_v4(), None).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_create_one_edge() {
        let repo = MemorySupportRepository::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.add(a, b).await.unwrap() }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(repo.count_supporters(b).await.unwrap(), 1);
    }
}
