//! PostgreSQL repository implementations

mod session;
mod support;
mod user;

pub use session::PgSessionRepository;
pub use support::PgSupportRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub sessions: PgSessionRepository,
    pub supports: PgSupportRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            supports: PgSupportRepository::new(pool),
        }
    }
}
