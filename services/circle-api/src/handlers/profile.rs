//! Profile and support handlers

use axum::extract::{Path, State};
use axum::Json;
use circle_types::ProfileView;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{AuthUser, OptionalAuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SupportResponse {
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct UnsupportResponse {
    pub removed: bool,
}

/// GET /api/v1/users/profile/{username}
///
/// The viewer is the authenticated user, if any
pub async fn get_profile(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileView>> {
    let view = state
        .circle
        .profile_by_username(&username, viewer.map(|v| v.user_id))
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/users/profile/{username}/support
pub async fn support(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<SupportResponse>> {
    let created = state
        .circle
        .support_by_username(auth_user.user_id, &username)
        .await?;
    Ok(Json(SupportResponse { created }))
}

/// DELETE /api/v1/users/profile/{username}/support
pub async fn unsupport(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<UnsupportResponse>> {
    let removed = state
        .circle
        .unsupport_by_username(auth_user.user_id, &username)
        .await?;
    Ok(Json(UnsupportResponse { removed }))
}
