//! Circle Types - Shared domain types
//!
//! This crate contains domain types used across Circle services:
//! - User identity and login selectors
//! - Token kinds and token pairs
//! - Profile views over the support graph

pub mod user;
pub mod session;
pub mod profile;
pub mod error;

pub use user::*;
pub use session::*;
pub use profile::*;
pub use error::*;
