//! Session lifecycle: login, refresh rotation, logout, access validation
//!
//! Each user owns exactly one session slot holding the digest of the one
//! refresh token that may currently be exchanged. Login overwrites the slot,
//! rotation swaps it conditionally, logout empties it. Access tokens are
//! never stored and are validated by signature and expiry alone.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use circle_db::{SessionRepository, UserRepository};
use circle_types::{LoginSelector, PublicUser, TokenKind, TokenPair, UserId};

use crate::crypto::{constant_time_str_eq, hash_token};
use crate::password::CredentialVerifier;
use crate::store::bounded;
use crate::token::TokenCodec;
use crate::AuthError;

/// Drives the per-user session slot state machine
pub struct SessionManager<U: UserRepository + ?Sized, S: SessionRepository + ?Sized> {
    codec: TokenCodec,
    credentials: Arc<CredentialVerifier<U>>,
    sessions: Arc<S>,
    store_timeout: Duration,
}

impl<U: UserRepository + ?Sized, S: SessionRepository + ?Sized> SessionManager<U, S> {
    pub fn new(
        codec: TokenCodec,
        credentials: Arc<CredentialVerifier<U>>,
        sessions: Arc<S>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            codec,
            credentials,
            sessions,
            store_timeout,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verify credentials, issue a fresh pair and overwrite the slot.
    ///
    /// Any refresh token issued by an earlier login stops working.
    pub async fn login(
        &self,
        selector: &LoginSelector,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(PublicUser, TokenPair), AuthError> {
        let user = self.credentials.authenticate(selector, password).await?;
        let user_id = user.id;
        let (pair, refresh_expires_at) = self.codec.issue_pair(user_id, now)?;

        bounded(
            self.store_timeout,
            "sessions.replace",
            self.sessions.replace(
                user_id.0,
                &hash_token(&pair.refresh_token),
                refresh_expires_at,
            ),
        )
        .await?;

        tracing::info!(user_id = %user_id, "User logged in");
        Ok((user, pair))
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The presented token must be the one in the slot. A signed, unexpired
    /// token that no longer matches is treated as stolen.
    pub async fn rotate(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let decoded = self.codec.decode_kind(TokenKind::Refresh, refresh_token, now)?;
        let user_id = decoded.user_id;

        let slot = bounded(
            self.store_timeout,
            "sessions.find_by_user_id",
            self.sessions.find_by_user_id(user_id.0),
        )
        .await?;

        let current = match slot.and_then(|s| s.refresh_token_hash) {
            Some(hash) => hash,
            None => {
                tracing::debug!(user_id = %user_id, "Refresh presented for empty slot");
                return Err(AuthError::InvalidToken);
            }
        };

        let presented = hash_token(refresh_token);
        if !constant_time_str_eq(&presented, &current) {
            tracing::warn!(user_id = %user_id, "Refresh token reuse detected");
            return Err(AuthError::TokenReuseDetected);
        }

        let (pair, refresh_expires_at) = self.codec.issue_pair(user_id, now)?;
        let swapped = bounded(
            self.store_timeout,
            "sessions.compare_and_swap",
            self.sessions.compare_and_swap(
                user_id.0,
                &presented,
                &hash_token(&pair.refresh_token),
                refresh_expires_at,
            ),
        )
        .await?;

        if !swapped {
            tracing::warn!(user_id = %user_id, "Refresh token reuse detected (lost rotation race)");
            return Err(AuthError::TokenReuseDetected);
        }

        tracing::debug!(user_id = %user_id, "Refresh token rotated");
        Ok(pair)
    }

    /// Empty the slot. Idempotent.
    pub async fn logout(&self, user_id: UserId) -> Result<(), AuthError> {
        bounded(
            self.store_timeout,
            "sessions.clear",
            self.sessions.clear(user_id.0),
        )
        .await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Check an access token. No I/O.
    pub fn validate_access(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, AuthError> {
        self.codec
            .decode_kind(TokenKind::Access, token, now)
            .map(|decoded| decoded.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::password::{Argon2Hasher, PasswordHasher};
    use circle_db::memory::{MemorySessionRepository, MemoryUserRepository};
    use circle_db::CreateUser;
    use uuid::Uuid;

    type Manager = SessionManager<MemoryUserRepository, MemorySessionRepository>;

    async fn manager() -> (Manager, Arc<MemorySessionRepository>, UserId) {
        let users = Arc::new(MemoryUserRepository::new());
        let sessions = Arc::new(MemorySessionRepository::new());
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap());

        let id = Uuid::new_v4();
        users
            .create(CreateUser {
                id,
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                full_name: "Bob".to_string(),
                password_hash: hasher.hash("pw").unwrap(),
            })
            .await
            .unwrap();

        let timeout = Duration::from_secs(1);
        let credentials = Arc::new(CredentialVerifier::new(users, hasher, timeout).unwrap());
        let codec =
            TokenCodec::new(&TokenConfig::try_new("a".repeat(32), "r".repeat(32)).unwrap()).unwrap();
        let manager = SessionManager::new(codec, credentials, Arc::clone(&sessions), timeout);
        (manager, sessions, UserId(id))
    }

    fn bob() -> LoginSelector {
        LoginSelector::Username("bob".to_string())
    }

    #[tokio::test]
    async fn test_login_stores_digest_not_token() {
        let (manager, sessions, id) = manager().await;
        let (user, pair) = manager.login(&bob(), "pw", Utc::now()).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "bob");

        let slot = sessions.find_by_user_id(id.0).await.unwrap().unwrap();
        let stored = slot.refresh_token_hash.unwrap();
        assert_ne!(stored, pair.refresh_token);
        assert_eq!(stored, hash_token(&pair.refresh_token));
    }

    #[tokio::test]
    async fn test_rotate_then_reuse() {
        let (manager, _, _) = manager().await;
        let now = Utc::now();
        let (_, first) = manager.login(&bob(), "pw", now).await.unwrap();

        let second = manager.rotate(&first.refresh_token, now).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        assert!(matches!(
            manager.rotate(&first.refresh_token, now).await,
            Err(AuthError::TokenReuseDetected)
        ));
        assert!(manager.rotate(&second.refresh_token, now).await.is_ok());
    }

    #[tokio::test]
    async fn test_access_token_cannot_rotate() {
        let (manager, _, _) = manager().await;
        let now = Utc::now();
        let (_, pair) = manager.login(&bob(), "pw", now).await.unwrap();

        assert!(matches!(
            manager.rotate(&pair.access_token, now).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            manager.validate_access(&pair.refresh_token, now),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_logout_then_rotate_is_invalid() {
        let (manager, _, id) = manager().await;
        let now = Utc::now();
        let (_, pair) = manager.login(&bob(), "pw", now).await.unwrap();

        manager.logout(id).await.unwrap();
        manager.logout(id).await.unwrap();

        assert!(matches!(
            manager.rotate(&pair.refresh_token, now).await,
            Err(AuthError::InvalidToken)
        ));
        // Access tokens stay valid until expiry
        assert_eq!(manager.validate_access(&pair.access_token, now).unwrap(), id);
    }
}
