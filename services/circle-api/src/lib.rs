//! Circle API
//!
//! HTTP surface for session lifecycle and profile operations.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let users = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/refresh-token", post(handlers::refresh))
        .route("/change-password", post(handlers::change_password))
        .route("/current-user", get(handlers::current_user))
        .route("/profile/{username}", get(handlers::get_profile))
        .route(
            "/profile/{username}/support",
            post(handlers::support).delete(handlers::unsupport),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .nest("/api/v1/users", users)
        .layer(TimeoutLayer::new(state.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
