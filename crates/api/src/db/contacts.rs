//! Contact repository for database operations.
//!
//! All contact queries are owner-aware: reads fold the owner into the
//! predicate where the API contract requires it, and writes rely on the
//! owner-scoped unique indexes as the last line of defence against
//! duplicate email/mobile pairs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use phonebook_core::{ContactId, Email, MobileNumber, UserId};

use super::RepositoryError;
use crate::models::{Contact, NewContact};

/// Row shape shared by the contact queries.
#[derive(sqlx::FromRow)]
struct ContactRow {
    id: ContactId,
    name: String,
    email: Email,
    mobile_number: MobileNumber,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            mobile_number: row.mobile_number,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, name, email, mobile_number, owner_id, created_at, updated_at";

/// Escape LIKE wildcards in a user-supplied search term.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Build the ILIKE pattern for a substring search, if the term is non-empty.
pub(crate) fn search_pattern(search: &str) -> Option<String> {
    let term = search.trim();
    if term.is_empty() {
        None
    } else {
        Some(format!("%{}%", escape_like(term)))
    }
}

/// Repository for contact database operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a contact by ID, scoped to its owner.
    ///
    /// The owner is part of the lookup predicate, so a contact belonging to
    /// another user is indistinguishable from a missing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_owner(
        &self,
        id: ContactId,
        owner_id: UserId,
    ) -> Result<Option<Contact>, RepositoryError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM contacts WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Contact::from))
    }

    /// Get a contact by ID regardless of owner.
    ///
    /// Used by update/delete, where existence and ownership are reported
    /// separately (404 vs 403).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let row: Option<ContactRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM contacts WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Contact::from))
    }

    /// Find a contact of the same owner that already uses the given email or
    /// mobile number, optionally excluding one contact ID (the record being
    /// updated).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_duplicate(
        &self,
        owner_id: UserId,
        email: &Email,
        mobile_number: &MobileNumber,
        exclude: Option<ContactId>,
    ) -> Result<Option<ContactId>, RepositoryError> {
        let row: Option<(ContactId,)> = sqlx::query_as(
            r"
            SELECT id
            FROM contacts
            WHERE owner_id = $1
              AND (email = $2 OR mobile_number = $3)
              AND ($4::integer IS NULL OR id <> $4)
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(owner_id)
        .bind(email)
        .bind(mobile_number)
        .bind(exclude)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    /// List a page of an owner's contacts, optionally filtered by a
    /// case-insensitive substring match on name, email, or mobile number.
    ///
    /// Returns the page of contacts and the total count for the same
    /// predicate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list(
        &self,
        owner_id: UserId,
        search: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Contact>, i64), RepositoryError> {
        let pattern = search_pattern(search);

        let rows: Vec<ContactRow> = sqlx::query_as(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM contacts
            WHERE owner_id = $1
              AND ($2::text IS NULL
                   OR name ILIKE $2
                   OR email ILIKE $2
                   OR mobile_number ILIKE $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(owner_id)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM contacts
            WHERE owner_id = $1
              AND ($2::text IS NULL
                   OR name ILIKE $2
                   OR email ILIKE $2
                   OR mobile_number ILIKE $2)
            ",
        )
        .bind(owner_id)
        .bind(&pattern)
        .fetch_one(self.pool)
        .await?;

        Ok((rows.into_iter().map(Contact::from).collect(), total))
    }

    /// Insert a new contact for the given owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner already has a contact
    /// with this email or mobile number (unique index violation).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        owner_id: UserId,
        input: &NewContact,
    ) -> Result<Contact, RepositoryError> {
        let row: ContactRow = sqlx::query_as(&format!(
            r"
            INSERT INTO contacts (name, email, mobile_number, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.mobile_number)
        .bind(owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(Contact::from(row))
    }

    /// Overwrite a contact's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    /// Returns `RepositoryError::Conflict` on a unique index violation.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ContactId,
        input: &NewContact,
    ) -> Result<Contact, RepositoryError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            r"
            UPDATE contacts
            SET name = $1, email = $2, mobile_number = $3, updated_at = now()
            WHERE id = $4
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.mobile_number)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.map(Contact::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a contact permanently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ContactId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Reconcile a batch of imported rows for one owner.
    ///
    /// Runs inside a single transaction: rows are upserted sequentially in
    /// file order, keyed by `(owner_id, email OR mobile_number)`. A matching
    /// contact is overwritten with the row's values; otherwise the row is
    /// inserted. Any failure rolls back the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a unique index violation.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn import_rows(
        &self,
        owner_id: UserId,
        rows: &[NewContact],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            // Overwrite the earliest natural-key match, if any.
            let updated = sqlx::query(
                r"
                UPDATE contacts
                SET name = $1, email = $2, mobile_number = $3, updated_at = now()
                WHERE id = (
                    SELECT id
                    FROM contacts
                    WHERE owner_id = $4 AND (email = $2 OR mobile_number = $3)
                    ORDER BY id
                    LIMIT 1
                )
                ",
            )
            .bind(&row.name)
            .bind(&row.email)
            .bind(&row.mobile_number)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

            if updated.rows_affected() == 0 {
                sqlx::query(
                    r"
                    INSERT INTO contacts (name, email, mobile_number, owner_id)
                    VALUES ($1, $2, $3, $4)
                    ",
                )
                .bind(&row.name)
                .bind(&row.email)
                .bind(&row.mobile_number)
                .bind(owner_id)
                .execute(&mut *tx)
                .await
                .map_err(map_unique_violation)?;
            }
        }

        tx.commit().await?;

        Ok(())
    }
}

/// Map a unique index violation to `Conflict`, passing other errors through.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email or mobile number already exists".to_owned());
    }
    RepositoryError::Database(e)
}
