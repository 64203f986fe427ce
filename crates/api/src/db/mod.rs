//! Database operations for the phonebook `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Account identities and password hashes
//! - `contacts` - Phonebook entries, keyed by owning user
//!
//! Contact uniqueness is owner-scoped and enforced by unique compound
//! indexes on `(owner_id, email)` and `(owner_id, mobile_number)`; the
//! repositories map violations of those indexes to [`RepositoryError::Conflict`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via `sqlx migrate run`.

pub mod contacts;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use contacts::ContactRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., owner-scoped unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The pool is the process-wide store handle: opened once at startup,
/// injected through `AppState`, and closed when the process exits.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
