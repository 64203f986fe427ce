//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use phonebook_core::{Email, UserId};

/// A registered user (domain type).
///
/// This is the outward-facing projection of an account: the password hash
/// lives only in the `users` table and in the repository's credential
/// lookup, never on this type, so it cannot be serialized by accident.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address (globally unique).
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
