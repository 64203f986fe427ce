//! Authentication service.
//!
//! Registers and authenticates users and hands out bearer tokens. Password
//! hashing is an explicit step inside [`AuthService::register`]; there is no
//! save-hook magic, so a password can never end up stored un-hashed.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use phonebook_core::UserId;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::token::TokenService;
use crate::validate::RegisterInput;

/// A user together with a freshly issued access token.
#[derive(Debug)]
pub struct AuthenticatedUser {
    /// The user's public fields.
    pub user: User,
    /// Bearer token bound to the user's id.
    pub access_token: String,
}

/// Authentication service.
///
/// Handles registration, login, and resolving the current user from a
/// verified token subject.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user and issue an access token.
    ///
    /// The email-taken check is a fast path; the unique index on
    /// `users.email` is what actually guarantees one account per email, and
    /// its violation maps to the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthenticatedUser, AuthError> {
        if self.users.get_by_email(&input.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(&input.name, &input.email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        let access_token = self.tokens.issue(user.id)?;

        Ok(AuthenticatedUser { user, access_token })
    }

    /// Login with email and password, issuing a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email and for a
    /// wrong password alike.
    pub async fn login(
        &self,
        email: &phonebook_core::Email,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let access_token = self.tokens.issue(user.id)?;

        Ok(AuthenticatedUser { user, access_token })
    }

    /// Get a user by ID (the verified token subject).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user no longer exists.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Hash a password using Argon2id with a per-record random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(matches!(
            verify_password("incorrect horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
