//! Common test utilities for circle-core integration tests

pub mod slow_repos;

use std::sync::Arc;
use std::time::Duration;

use circle_core::{Argon2Hasher, CircleService, CoreConfig, PasswordHasher, TokenConfig};
use circle_db::memory::{MemorySessionRepository, MemorySupportRepository, MemoryUserRepository};
use circle_db::{CreateUser, MemoryRepositories, UserRepository};
use circle_types::UserId;
use uuid::Uuid;

#[allow(unused_imports)]
pub use slow_repos::{SlowSessionRepository, StallingByIdUserRepository};

pub type MemoryService =
    CircleService<MemoryUserRepository, MemorySessionRepository, MemorySupportRepository>;

pub const PASSWORD: &str = "correct horse battery staple";

/// Argon2 with minimal cost so tests stay fast in debug builds
pub fn fast_hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2Hasher::with_params(8, 1, 1).expect("valid argon2 params"))
}

pub fn core_config() -> CoreConfig {
    let token = TokenConfig::try_new("access-secret-".repeat(3), "refresh-secret-".repeat(3))
        .expect("secrets long enough");
    CoreConfig::new(token).with_store_timeout(Duration::from_millis(500))
}

/// Service over fresh in-memory repositories
pub struct Fixture {
    pub repos: MemoryRepositories,
    pub hasher: Arc<dyn PasswordHasher>,
    pub service: MemoryService,
}

impl Fixture {
    pub fn new() -> Self {
        let repos = MemoryRepositories::new();
        let hasher = fast_hasher();
        let service = CircleService::new(
            core_config(),
            Arc::new(repos.users.clone()),
            Arc::new(repos.sessions.clone()),
            Arc::new(repos.supports.clone()),
            Arc::clone(&hasher),
        )
        .expect("service builds");
        Self {
            repos,
            hasher,
            service,
        }
    }

    /// Insert a user whose password is [`PASSWORD`]
    pub async fn user(&self, username: &str) -> UserId {
        let id = Uuid::new_v4();
        self.repos
            .users
            .create(CreateUser {
                id,
                username: username.to_string(),
                email: format!("{username}@example.com"),
                full_name: username.to_uppercase(),
                password_hash: self.hasher.hash(PASSWORD).expect("hash"),
            })
            .await
            .expect("create user");
        UserId(id)
    }
}
