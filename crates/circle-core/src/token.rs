//! Access and refresh token codec
//!
//! Tokens are HS256 JWTs. Each kind has its own secret and lifetime, and the
//! kind is also embedded as a claim so a token verified under one key can
//! never be accepted as the other kind.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use circle_types::{TokenKind, TokenPair, UserId};
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::TokenConfig;
use crate::crypto::SigningKey;
use crate::AuthError;

/// Claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Token kind
    pub kind: TokenKind,
    /// Unique token ID, so two tokens minted in the same second differ
    pub jti: String,
    /// Issued at (seconds)
    pub iat: i64,
    /// Expiration (seconds)
    pub exp: i64,
}

/// A freshly minted token and its absolute expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub user_id: UserId,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

/// Issues and decodes signed bearer tokens. Pure: never touches a store.
#[derive(Clone)]
pub struct TokenCodec {
    access_key: SigningKey,
    refresh_key: SigningKey,
    access_ttl: ChronoDuration,
    refresh_ttl: ChronoDuration,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from token configuration
    pub fn new(config: &TokenConfig) -> Result<Self, AuthError> {
        let access_key = SigningKey::new(&config.access_secret)
            .map_err(|e| AuthError::Configuration(format!("access secret: {e}")))?;
        let refresh_key = SigningKey::new(&config.refresh_secret)
            .map_err(|e| AuthError::Configuration(format!("refresh secret: {e}")))?;

        let access_ttl = ChronoDuration::from_std(config.access_ttl)
            .map_err(|_| AuthError::Configuration("access ttl out of range".to_string()))?;
        let refresh_ttl = ChronoDuration::from_std(config.refresh_ttl)
            .map_err(|_| AuthError::Configuration("refresh ttl out of range".to_string()))?;

        // Expiry is checked against the caller's clock in `decode`, not the
        // library's, so that `now` stays an explicit input.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            access_key,
            refresh_key,
            access_ttl,
            refresh_ttl,
            validation,
        })
    }

    /// Lifetime of tokens of the given kind
    pub fn ttl(&self, kind: TokenKind) -> ChronoDuration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn key(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Access => &self.access_key,
            TokenKind::Refresh => &self.refresh_key,
        }
    }

    /// Issue a token of `kind` for `user_id`, valid from `now`
    pub fn issue(
        &self,
        kind: TokenKind,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        // `exp` has whole-second resolution; the reported expiry must match it
        let expires_at = Utc
            .timestamp_opt((now + self.ttl(kind)).timestamp(), 0)
            .single()
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, self.key(kind).encoding())
            .map_err(|e| {
                tracing::error!("Failed to sign {} token: {}", kind, e);
                AuthError::Internal("Failed to sign token".to_string())
            })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Issue an access/refresh pair. Also returns the refresh token's expiry.
    pub fn issue_pair(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(TokenPair, DateTime<Utc>), AuthError> {
        let access = self.issue(TokenKind::Access, user_id, now)?;
        let refresh = self.issue(TokenKind::Refresh, user_id, now)?;

        let pair = TokenPair::bearer(
            access.token,
            refresh.token,
            self.access_ttl.num_seconds().max(0) as u64,
            self.refresh_ttl.num_seconds().max(0) as u64,
        );
        Ok((pair, refresh.expires_at))
    }

    /// Decode a token of either kind.
    ///
    /// Fails with `InvalidToken` if no key verifies the signature, the
    /// embedded kind disagrees with the verifying key, `now` is past the
    /// expiry, or the token is malformed.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<DecodedToken, AuthError> {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            if let Ok(decoded) = self.decode_kind(kind, token, now) {
                return Ok(decoded);
            }
        }
        Err(AuthError::InvalidToken)
    }

    /// Decode a token that must be of `expected` kind
    pub fn decode_kind(
        &self,
        expected: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<DecodedToken, AuthError> {
        let data = decode::<TokenClaims>(token, self.key(expected).decoding(), &self.validation)
            .map_err(|e| {
                tracing::debug!("{} token rejected: {}", expected, e);
                AuthError::InvalidToken
            })?;
        let claims = data.claims;

        if claims.kind != expected {
            tracing::debug!("Token kind mismatch: expected {}, got {}", expected, claims.kind);
            return Err(AuthError::InvalidToken);
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AuthError::InvalidToken)?;
        if now > expires_at {
            tracing::debug!("{} token expired", expected);
            return Err(AuthError::InvalidToken);
        }

        let user_id = UserId::parse(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(DecodedToken {
            user_id,
            kind: claims.kind,
            expires_at,
        })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}
