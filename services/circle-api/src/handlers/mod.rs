//! HTTP handlers

mod auth;
mod health;
mod profile;

pub use auth::{change_password, current_user, login, logout, refresh};
pub use health::{health, ready};
pub use profile::{get_profile, support, unsupport};
