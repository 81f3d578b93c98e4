//! Session handlers (login, logout, refresh, change-password, current-user)

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use circle_types::{LoginSelector, PublicUser, TokenPair};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AuthUser, RefreshCookie, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "oldPassword")]
    pub old_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ============================================================================
// Cookies
// ============================================================================

fn set_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={value}; HttpOnly{secure}; SameSite=Strict; Path=/; Max-Age={max_age_secs}")
}

fn token_cookies(
    state: &AppState,
    tokens: &TokenPair,
) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    let secure = state.config.cookie_secure;
    AppendHeaders([
        (
            header::SET_COOKIE,
            set_cookie(ACCESS_COOKIE, &tokens.access_token, tokens.expires_in, secure),
        ),
        (
            header::SET_COOKIE,
            set_cookie(
                REFRESH_COOKIE,
                &tokens.refresh_token,
                tokens.refresh_expires_in,
                secure,
            ),
        ),
    ])
}

fn cleared_cookies(state: &AppState) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    let secure = state.config.cookie_secure;
    AppendHeaders([
        (header::SET_COOKIE, set_cookie(ACCESS_COOKIE, "", 0, secure)),
        (header::SET_COOKIE, set_cookie(REFRESH_COOKIE, "", 0, secure)),
    ])
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/users/login
///
/// Verify credentials, start a new session and return the token pair
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let selector = LoginSelector::from_parts(req.username.as_deref(), req.email.as_deref())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }

    let (user, tokens) = state.circle.login(&selector, &req.password).await?;

    let cookies = token_cookies(&state, &tokens);
    Ok((cookies, Json(LoginResponse { user, tokens })))
}

/// POST /api/v1/users/logout
///
/// Empty the session slot and expire both cookies
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    state.circle.logout(auth_user.user_id).await?;
    Ok((cleared_cookies(&state), Json(SuccessResponse { success: true })))
}

/// POST /api/v1/users/refresh-token
///
/// Rotate the refresh token. Read from the cookie, else from the JSON body.
pub async fn refresh(
    State(state): State<AppState>,
    RefreshCookie(cookie): RefreshCookie,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let refresh_token = match cookie {
        Some(token) => token,
        None => {
            let req: RefreshRequest = if body.is_empty() {
                RefreshRequest::default()
            } else {
                serde_json::from_slice(&body)
                    .map_err(|e| ApiError::BadRequest(format!("invalid body: {e}")))?
            };
            req.refresh_token
                .filter(|t| !t.is_empty())
                .ok_or(ApiError::MissingToken)?
        }
    };

    let tokens = state.circle.rotate(&refresh_token).await?;
    Ok((token_cookies(&state, &tokens), Json(tokens)))
}

/// POST /api/v1/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    if req.new_password.is_empty() {
        return Err(ApiError::BadRequest("new_password is required".to_string()));
    }

    state
        .circle
        .change_password(auth_user.user_id, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/v1/users/current-user
pub async fn current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = state.circle.current_user(auth_user.user_id).await?;
    Ok(Json(user))
}
