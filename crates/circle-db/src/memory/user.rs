//! In-memory user repository

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::UserRow;
use crate::repo::{CreateUser, UserRepository};

/// In-memory user repository
#[derive(Default, Clone)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_username: Arc<DashMap<String, Uuid>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, id: &Uuid) -> Option<UserRow> {
        self.users.get(id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.get(&id))
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .by_username
            .get(username)
            .and_then(|id| self.get(id.value())))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self.by_email.get(email).and_then(|id| self.get(id.value())))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let username = user.username.to_lowercase();

        // Claim the username first; the entry guard makes the check atomic.
        match self.by_username.entry(username.clone()) {
            Entry::Occupied(_) => {
                return Err(DbError::Conflict("username already exists".to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => {
                self.by_username.remove(&username);
                return Err(DbError::Conflict("email already exists".to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        let now = Utc::now();
        let row = UserRow {
            id: user.id,
            username,
            email: user.email,
            full_name: user.full_name,
            bio: String::new(),
            home_town: String::new(),
            dp: String::new(),
            cover_pic: String::new(),
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        let mut user = self.users.get_mut(&id).ok_or(DbError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password_hash: "digest".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = MemoryUserRepository::new();
        let user = repo.create(new_user("Alice", "alice@example.com")).await.unwrap();
        assert_eq!(user.username, "alice");

        assert!(repo.find_by_id(user.id).await.unwrap().is_some());
        assert!(repo.find_by_username("alice").await.unwrap().is_some());
        assert!(repo.find_by_email("alice@example.com").await.unwrap().is_some());
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("alice", "alice@example.com")).await.unwrap();

        let dup_name = repo.create(new_user("ALICE", "other@example.com")).await;
        assert!(matches!(dup_name, Err(DbError::Conflict(_))));

        let dup_email = repo.create(new_user("carol", "alice@example.com")).await;
        assert!(matches!(dup_email, Err(DbError::Conflict(_))));
        // The failed attempt must not leave its username claimed
        assert!(repo.find_by_username("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let repo = MemoryUserRepository::new();
        let user = repo.create(new_user("alice", "alice@example.com")).await.unwrap();

        repo.update_password_hash(user.id, "new-digest").await.unwrap();
        let found = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "new-digest");

        let missing = repo.update_password_hash(Uuid::new_v4(), "x").await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }
}
