//! Profile view over the support graph

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Read-only aggregate shown when one user looks at another's profile.
///
/// Counts are always relative to the viewed user; `is_supporter` is relative
/// to the viewer and is `false` for anonymous viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub dp: String,
    pub cover_pic: String,
    pub supporters_count: u64,
    pub supporting_count: u64,
    pub is_supporter: bool,
}
