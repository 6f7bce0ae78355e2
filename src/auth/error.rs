//! Auth errors

use thiserror::Error;

use crate::db::StoreError;

/// Failures of the authentication lifecycle.
///
/// `InvalidCredentials` covers both an unknown email and a wrong password.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired session")]
    InvalidSession,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The OS random source failed while producing a token or salt.
    #[error("secure random source unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}
