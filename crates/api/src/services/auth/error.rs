//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password or user not found).
    ///
    /// A single variant on purpose: login must not reveal whether the email
    /// exists.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found (token subject no longer resolves).
    #[error("user not found")]
    UserNotFound,

    /// A user with this email already exists.
    #[error("email already exists")]
    EmailTaken,

    /// Token issue/verify error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
