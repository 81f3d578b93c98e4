//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use circle_types::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Authenticated user extracted from a valid access token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = access_token(parts)?.ok_or(ApiError::MissingToken)?;

        let user_id = app_state.circle.validate_access(&token).map_err(|e| {
            tracing::debug!(error = ?e, "Access token rejected");
            ApiError::from(e)
        })?;

        Ok(AuthUser { user_id })
    }
}

/// Optional auth extractor - anonymous when no token is presented.
///
/// A presented but invalid token is still rejected.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if access_token(parts)?.is_none() {
            return Ok(OptionalAuthUser(None));
        }
        AuthUser::from_request_parts(parts, state)
            .await
            .map(|user| OptionalAuthUser(Some(user)))
    }
}

/// Access token from the Authorization header, falling back to the cookie
fn access_token(parts: &Parts) -> Result<Option<String>, ApiError> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::BadRequest("Invalid Authorization header encoding".into()))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(Some(token.to_string()));
            }
        }
    }

    cookie(parts, ACCESS_COOKIE)
}

/// Read a named cookie from the request
pub fn cookie(parts: &Parts, name: &str) -> Result<Option<String>, ApiError> {
    for value in parts.headers.get_all(header::COOKIE) {
        let cookie_str = value
            .to_str()
            .map_err(|_| ApiError::BadRequest("Invalid Cookie header encoding".into()))?;

        for pair in cookie_str.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name && !value.is_empty() {
                    return Ok(Some(value.to_string()));
                }
            }
        }
    }
    Ok(None)
}

/// Refresh token cookie, if any
#[derive(Debug, Clone)]
pub struct RefreshCookie(pub Option<String>);

impl<S> FromRequestParts<S> for RefreshCookie
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        cookie(parts, REFRESH_COOKIE).map(RefreshCookie)
    }
}
