//! Circle Core - session lifecycle and support-graph business logic
//!
//! Credential verification, access/refresh token issuance with single-slot
//! refresh rotation, and profile aggregation over the support graph.

pub mod config;
pub mod crypto;
pub mod error;
pub mod graph;
pub mod password;
pub mod profile;
pub mod service;
pub mod session;
pub mod store;
pub mod token;

pub use config::*;
pub use error::*;
pub use password::{Argon2Hasher, CredentialVerifier, PasswordHasher};
pub use service::*;
pub use session::SessionManager;
pub use token::{DecodedToken, IssuedToken, TokenClaims, TokenCodec};
