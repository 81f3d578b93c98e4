//! Application state

use std::ops::Deref;
use std::sync::Arc;

use circle_core::{CircleService, PasswordHasher};
use circle_db::{
    DbPool, MemoryRepositories, Repositories, SessionRepository, SupportRepository,
    UserRepository,
};

use crate::config::Config;

/// Core service over type-erased repositories, so one router serves either backend
pub type CircleServiceImpl =
    CircleService<dyn UserRepository, dyn SessionRepository, dyn SupportRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle and profile operations
    pub circle: Arc<CircleServiceImpl>,
    /// Database connection pool, absent on the in-memory backend
    pub pool: Option<SharedPool>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(
        config: Config,
        pool: DbPool,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, circle_core::AuthError> {
        let repos = Repositories::new(pool.clone());
        let circle = CircleService::new(
            config.core.clone(),
            Arc::new(repos.users) as Arc<dyn UserRepository>,
            Arc::new(repos.sessions) as Arc<dyn SessionRepository>,
            Arc::new(repos.supports) as Arc<dyn SupportRepository>,
            hasher,
        )?;
        Ok(Self {
            circle: Arc::new(circle),
            pool: Some(SharedPool(Arc::new(pool))),
            config: Arc::new(config),
        })
    }

    /// State backed by the given in-memory repositories
    pub fn memory(
        config: Config,
        repos: &MemoryRepositories,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, circle_core::AuthError> {
        let circle = CircleService::new(
            config.core.clone(),
            Arc::new(repos.users.clone()) as Arc<dyn UserRepository>,
            Arc::new(repos.sessions.clone()) as Arc<dyn SessionRepository>,
            Arc::new(repos.supports.clone()) as Arc<dyn SupportRepository>,
            hasher,
        )?;
        Ok(Self {
            circle: Arc::new(circle),
            pool: None,
            config: Arc::new(config),
        })
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
