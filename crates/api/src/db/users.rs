//! User repository for database operations.
//!
//! Queries use sqlx's runtime API with `FromRow` row structs, so no live
//! database or offline cache is needed at compile time.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use phonebook_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

/// Row shape shared by the user queries.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Email,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row shape for credential lookup (user plus password hash).
#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: UserId,
    name: String,
    email: Email,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, name, email, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Create a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(User::from(row))
    }

    /// Get a user together with their password hash by email.
    ///
    /// Returns `None` if no user matches, so a caller cannot distinguish an
    /// unknown email from a wrong password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(
            r"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| {
            let hash = r.password_hash;
            (
                User {
                    id: r.id,
                    name: r.name,
                    email: r.email,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
                hash,
            )
        }))
    }
}
