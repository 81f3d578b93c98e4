//! In-memory repository implementations
//!
//! Same contracts as the PostgreSQL repositories. Used by tests and by the
//! API service when no database is configured. Nothing survives a restart.

mod session;
mod support;
mod user;

pub use session::MemorySessionRepository;
pub use support::MemorySupportRepository;
pub use user::MemoryUserRepository;

/// All in-memory repositories bundled together, sharing one user table
#[derive(Clone, Default)]
pub struct MemoryRepositories {
    pub users: MemoryUserRepository,
    pub sessions: MemorySessionRepository,
    pub supports: MemorySupportRepository,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        let users = MemoryUserRepository::new();
        Self {
            sessions: MemorySessionRepository::new(),
            supports: MemorySupportRepository::new(users.clone()),
            users,
        }
    }
}
