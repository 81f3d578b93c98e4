//! Password hashing and credential verification

use std::sync::Arc;
use std::time::Duration;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use circle_db::{UserRepository, UserRow};
use circle_types::{LoginSelector, PublicUser, UserId};

use crate::store::bounded;
use crate::AuthError;

/// One-way password digest
pub trait PasswordHasher: Send + Sync {
    /// Produce a PHC-formatted digest of `password`
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Check `password` against a stored digest. Malformed digests never match.
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id hasher
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Hasher with the crate's default cost parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters (memory in KiB, iterations, lanes)
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::Configuration(format!("argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                AuthError::Internal("Failed to hash password".to_string())
            })
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password digest is malformed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

/// Checks presented passwords against stored credential records
pub struct CredentialVerifier<U: UserRepository + ?Sized> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    /// Digest checked when the identity is unknown, so both paths cost the same
    dummy_digest: String,
    store_timeout: Duration,
}

impl<U: UserRepository + ?Sized> CredentialVerifier<U> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        store_timeout: Duration,
    ) -> Result<Self, AuthError> {
        let dummy_digest = hasher.hash("circle-dummy-password")?;
        Ok(Self {
            users,
            hasher,
            dummy_digest,
            store_timeout,
        })
    }

    /// Hash a new password off the async executor
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task failed: {e}")))?
    }

    async fn check(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task failed: {e}")))
    }

    /// Whether `password` matches the record for `user_id`. Unknown users never match.
    pub async fn verify(&self, user_id: UserId, password: &str) -> Result<bool, AuthError> {
        let row = bounded(
            self.store_timeout,
            "users.find_by_id",
            self.users.find_by_id(user_id.0),
        )
        .await?;
        self.check_row(row.as_ref(), password).await
    }

    /// Resolve a login selector and check the password, returning the
    /// public record of the matched user.
    ///
    /// Unknown identity and wrong password both yield `InvalidCredentials`.
    pub async fn authenticate(
        &self,
        selector: &LoginSelector,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        let row = self.lookup(selector).await?;

        if self.check_row(row.as_ref(), password).await? {
            // check_row only returns true for a present row
            row.map(|r| r.to_public()).ok_or(AuthError::InvalidCredentials)
        } else {
            tracing::debug!("Login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn lookup(&self, selector: &LoginSelector) -> Result<Option<UserRow>, AuthError> {
        match selector {
            LoginSelector::Username(username) => self.by_username(username).await,
            LoginSelector::Email(email) => self.by_email(email).await,
            LoginSelector::Either { username, email } => match self.by_username(username).await? {
                Some(row) => Ok(Some(row)),
                None => self.by_email(email).await,
            },
        }
    }

    async fn by_username(&self, username: &str) -> Result<Option<UserRow>, AuthError> {
        bounded(
            self.store_timeout,
            "users.find_by_username",
            self.users.find_by_username(username),
        )
        .await
    }

    async fn by_email(&self, email: &str) -> Result<Option<UserRow>, AuthError> {
        bounded(
            self.store_timeout,
            "users.find_by_email",
            self.users.find_by_email(email),
        )
        .await
    }

    async fn check_row(&self, row: Option<&UserRow>, password: &str) -> Result<bool, AuthError> {
        match row {
            Some(row) => self.check(password, &row.password_hash).await,
            None => {
                self.check(password, &self.dummy_digest).await?;
                Ok(false)
            }
        }
    }
}
