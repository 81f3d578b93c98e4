//! Circle DB - Database abstractions
//!
//! SQLx-based database layer for Circle services, plus an in-memory backend
//! with the same consistency guarantees for tests and local development.
//!
//! # Example
//!
//! ```rust,ignore
//! use circle_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("postgres://localhost/circle").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let user = repos.users.find_by_username("alice").await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::MemoryRepositories;
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
