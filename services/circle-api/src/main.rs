//! Circle API server

use std::net::SocketAddr;
use std::sync::Arc;

use circle_api::{app, AppState, Config};
use circle_core::{Argon2Hasher, PasswordHasher};
use circle_db::{create_pool, run_migrations, MemoryRepositories};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Circle API");

    let config = Config::from_env()?;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let port = config.http_port;

    let state = match config.database_url.clone() {
        Some(url) => {
            let pool = create_pool(&url).await?;
            run_migrations(&pool).await?;
            tracing::info!("Connected to PostgreSQL");
            AppState::postgres(config, pool, hasher)?
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, nothing will persist");
            AppState::memory(config, &MemoryRepositories::new(), hasher)?
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
