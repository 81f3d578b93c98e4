//! Circle service - ties together credentials, sessions, the support graph
//! and profile aggregation

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use circle_db::{SessionRepository, SupportRepository, UserRepository};
use circle_types::{LoginSelector, ProfileView, PublicUser, TokenPair, UserId};

use crate::{
    config::CoreConfig,
    graph::SupportGraph,
    password::{CredentialVerifier, PasswordHasher},
    profile::ProfileAggregator,
    session::SessionManager,
    store::bounded,
    token::TokenCodec,
    AuthError,
};

/// Entry point for every core operation.
///
/// Repositories are generic so the API can run the same service over
/// PostgreSQL or the in-memory backend.
pub struct CircleService<U, S, R>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: SupportRepository + ?Sized,
{
    credentials: Arc<CredentialVerifier<U>>,
    session_manager: SessionManager<U, S>,
    graph: SupportGraph<U, R>,
    profiles: ProfileAggregator<U, R>,
    users: Arc<U>,
    store_timeout: Duration,
}

impl<U, S, R> CircleService<U, S, R>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: SupportRepository + ?Sized,
{
    /// Create a new service
    pub fn new(
        config: CoreConfig,
        users: Arc<U>,
        sessions: Arc<S>,
        supports: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, AuthError> {
        let store_timeout = config.store_timeout;
        let codec = TokenCodec::new(&config.token)?;
        let credentials = Arc::new(CredentialVerifier::new(
            Arc::clone(&users),
            hasher,
            store_timeout,
        )?);

        Ok(Self {
            session_manager: SessionManager::new(
                codec,
                Arc::clone(&credentials),
                sessions,
                store_timeout,
            ),
            graph: SupportGraph::new(Arc::clone(&users), Arc::clone(&supports), store_timeout),
            profiles: ProfileAggregator::new(Arc::clone(&users), supports, store_timeout),
            credentials,
            users,
            store_timeout,
        })
    }

    pub fn token_codec(&self) -> &TokenCodec {
        self.session_manager.codec()
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Log in and return the user's public record with a fresh token pair
    pub async fn login(
        &self,
        selector: &LoginSelector,
        password: &str,
    ) -> Result<(PublicUser, TokenPair), AuthError> {
        self.session_manager.login(selector, password, Utc::now()).await
    }

    /// Exchange a refresh token for a new pair
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.session_manager.rotate(refresh_token, Utc::now()).await
    }

    /// Empty the user's session slot
    pub async fn logout(&self, user_id: UserId) -> Result<(), AuthError> {
        self.session_manager.logout(user_id).await
    }

    /// Validate an access token without touching the store
    pub fn validate_access(&self, token: &str) -> Result<UserId, AuthError> {
        self.session_manager.validate_access(token, Utc::now())
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Change a password after checking the old one.
    ///
    /// The session slot is left as is.
    pub async fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if !self.credentials.verify(user_id, old_password).await? {
            tracing::debug!(user_id = %user_id, "Password change rejected");
            return Err(AuthError::InvalidOldPassword);
        }

        let digest = self.credentials.hash(new_password).await?;
        bounded(
            self.store_timeout,
            "users.update_password_hash",
            self.users.update_password_hash(user_id.0, &digest),
        )
        .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Public projection of the user's own record
    pub async fn current_user(&self, user_id: UserId) -> Result<PublicUser, AuthError> {
        bounded(
            self.store_timeout,
            "users.find_by_id",
            self.users.find_by_id(user_id.0),
        )
        .await?
        .map(|row| row.to_public())
        .ok_or(AuthError::NotFound)
    }

    // =========================================================================
    // Support Graph
    // =========================================================================

    /// Profile of `target` as seen by `viewer`
    pub async fn profile_view(
        &self,
        target: UserId,
        viewer: Option<UserId>,
    ) -> Result<ProfileView, AuthError> {
        self.profiles.build_profile_view(target, viewer).await
    }

    /// Profile of the user named `username` as seen by `viewer`
    pub async fn profile_by_username(
        &self,
        username: &str,
        viewer: Option<UserId>,
    ) -> Result<ProfileView, AuthError> {
        self.profiles.profile_by_username(username, viewer).await
    }

    /// Start supporting `target`
    pub async fn support(&self, supporter: UserId, target: UserId) -> Result<bool, AuthError> {
        self.graph.support(supporter, target).await
    }

    /// Stop supporting `target`
    pub async fn unsupport(&self, supporter: UserId, target: UserId) -> Result<bool, AuthError> {
        self.graph.unsupport(supporter, target).await
    }

    /// Start supporting the user named `username`
    pub async fn support_by_username(
        &self,
        supporter: UserId,
        username: &str,
    ) -> Result<bool, AuthError> {
        let target = self.profiles.resolve(username).await?;
        self.graph.support(supporter, target).await
    }

    /// Stop supporting the user named `username`
    pub async fn unsupport_by_username(
        &self,
        supporter: UserId,
        username: &str,
    ) -> Result<bool, AuthError> {
        let target = self.profiles.resolve(username).await?;
        self.graph.unsupport(supporter, target).await
    }

    /// Whether `supporter` currently supports `target`
    pub async fn is_supporting(&self, supporter: UserId, target: UserId) -> Result<bool, AuthError> {
        self.graph.is_supporting(supporter, target).await
    }
}
