//! Authentication error types.

use thiserror::Error;

use marigold_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password doesn't meet requirements.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum required length.
        min: usize,
    },

    /// Email is already registered.
    #[error("email already registered")]
    UserAlreadyExists,

    /// Email/password combination is wrong.
    ///
    /// Deliberately does not say which half failed.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Bearer token is missing, malformed, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    Hashing(String),

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
