//! Contact service.
//!
//! Enforces the per-owner uniqueness and ownership invariants over the
//! contact store, serves paginated search, and reconciles bulk imports.
//!
//! The duplicate checks here are a fast path for good error messages; the
//! owner-scoped unique indexes are authoritative, and a racing write that
//! slips past the check still surfaces as the same conflict error.

mod error;
pub mod spreadsheet;

pub use error::ContactError;
pub use spreadsheet::XLSX_CONTENT_TYPE;

use serde::Serialize;
use sqlx::PgPool;

use phonebook_core::{ContactId, UserId};

use crate::db::RepositoryError;
use crate::db::contacts::ContactRepository;
use crate::models::{Contact, NewContact};
use crate::validate::validate_contact_fields;

/// Default page size for listing.
const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound on the requested page size.
const MAX_PAGE_SIZE: i64 = 100;

/// Pagination metadata returned alongside a listing page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    /// Total records matching the query.
    pub total: i64,
    /// Total pages at the current page size.
    pub total_pages: i64,
    /// Current page (1-indexed).
    pub page: i64,
    /// Page size.
    pub limit: i64,
}

/// An uploaded file as handed over by the HTTP layer.
#[derive(Debug)]
pub struct UploadedFile {
    /// Declared content type of the multipart field, if any.
    pub content_type: Option<String>,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Contact service.
pub struct ContactService<'a> {
    contacts: ContactRepository<'a>,
}

impl<'a> ContactService<'a> {
    /// Create a new contact service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            contacts: ContactRepository::new(pool),
        }
    }

    /// List an owner's contacts with pagination and optional search.
    ///
    /// `page` is 1-indexed and defaults to 1; `limit` defaults to 10 and is
    /// capped at 100. A non-empty `search` matches case-insensitively as a
    /// substring against name, email, or mobile number.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Repository` if the store queries fail.
    pub async fn list(
        &self,
        owner_id: UserId,
        page: Option<i64>,
        limit: Option<i64>,
        search: Option<&str>,
    ) -> Result<(Vec<Contact>, PageMeta), ContactError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        let (items, total) = self
            .contacts
            .list(owner_id, search.unwrap_or(""), limit, offset)
            .await?;

        Ok((items, page_meta(total, page, limit)))
    }

    /// Get one contact by ID, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` if no contact with this ID exists
    /// under this owner - a contact owned by someone else looks exactly the
    /// same as a missing one.
    pub async fn get(&self, id: ContactId, owner_id: UserId) -> Result<Contact, ContactError> {
        self.contacts
            .get_for_owner(id, owner_id)
            .await?
            .ok_or(ContactError::NotFound)
    }

    /// Create a contact for the given owner.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::AlreadyExists` if the owner already has a
    /// contact with the same email or the same mobile number.
    pub async fn create(
        &self,
        input: NewContact,
        owner_id: UserId,
    ) -> Result<Contact, ContactError> {
        let duplicate = self
            .contacts
            .find_duplicate(owner_id, &input.email, &input.mobile_number, None)
            .await?;

        if duplicate.is_some() {
            return Err(ContactError::AlreadyExists);
        }

        self.contacts
            .insert(owner_id, &input)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ContactError::AlreadyExists,
                other => ContactError::Repository(other),
            })
    }

    /// Update a contact.
    ///
    /// The check order is part of the API contract: existence first (404),
    /// then uniqueness against the owner's other contacts (409), then
    /// ownership (403).
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound`, `ContactError::DuplicateField`, or
    /// `ContactError::NotOwner` per the order above.
    pub async fn update(
        &self,
        id: ContactId,
        owner_id: UserId,
        input: NewContact,
    ) -> Result<Contact, ContactError> {
        let existing = self
            .contacts
            .get_by_id(id)
            .await?
            .ok_or(ContactError::NotFound)?;

        let duplicate = self
            .contacts
            .find_duplicate(owner_id, &input.email, &input.mobile_number, Some(id))
            .await?;

        if duplicate.is_some() {
            return Err(ContactError::DuplicateField);
        }

        ensure_owner(&existing, owner_id)?;

        self.contacts.update(id, &input).await.map_err(|e| match e {
            RepositoryError::NotFound => ContactError::NotFound,
            RepositoryError::Conflict(_) => ContactError::DuplicateField,
            other => ContactError::Repository(other),
        })
    }

    /// Delete a contact permanently.
    ///
    /// Uses the same ownership check as update, so the two paths cannot
    /// drift apart.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::NotFound` if the contact does not exist and
    /// `ContactError::NotOwner` if it belongs to another user.
    pub async fn delete(&self, id: ContactId, owner_id: UserId) -> Result<(), ContactError> {
        let existing = self
            .contacts
            .get_by_id(id)
            .await?
            .ok_or(ContactError::NotFound)?;

        ensure_owner(&existing, owner_id)?;

        self.contacts.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => ContactError::NotFound,
            other => ContactError::Repository(other),
        })
    }

    /// Import contacts from an uploaded xlsx file.
    ///
    /// File checks run in order and short-circuit: present, declared
    /// content type, size. Every data row is validated with the same rules
    /// as a direct create before anything is written; the batch then runs
    /// inside one transaction of sequential upserts keyed by
    /// `(owner, email OR mobile_number)`, in file order. The first failure
    /// aborts and rolls back the whole import.
    ///
    /// # Errors
    ///
    /// Returns the file-validation errors (`MissingFile`,
    /// `UnsupportedFileType`, `FileTooLarge`), `Spreadsheet` for an
    /// unreadable workbook, `InvalidRow` for the first malformed row, or
    /// `Repository` if the store rejects the batch.
    pub async fn import_spreadsheet(
        &self,
        file: Option<UploadedFile>,
        owner_id: UserId,
        max_bytes: usize,
    ) -> Result<(), ContactError> {
        let file = check_upload(file, max_bytes)?;

        let rows = spreadsheet::extract_rows(&file.bytes)?;

        let mut validated = Vec::with_capacity(rows.len());
        for row in &rows {
            let contact = validate_contact_fields(&row.name, &row.email, &row.mobile_number)
                .map_err(|errors| ContactError::InvalidRow {
                    row: row.row_number,
                    errors,
                })?;
            validated.push(contact);
        }

        self.import_contacts(owner_id, &validated).await
    }

    /// Reconcile a batch of validated rows for one owner.
    ///
    /// The upsert key is `(owner, email OR mobile_number)`, so a row can
    /// match one contact by email while another contact already holds the
    /// row's mobile number; the resulting unique-index violation is a data
    /// conflict, not a server fault.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::DuplicateField` on a uniqueness conflict and
    /// `ContactError::Repository` for other store failures; either way the
    /// whole batch is rolled back.
    pub async fn import_contacts(
        &self,
        owner_id: UserId,
        rows: &[NewContact],
    ) -> Result<(), ContactError> {
        self.contacts
            .import_rows(owner_id, rows)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ContactError::DuplicateField,
                other => ContactError::Repository(other),
            })
    }
}

/// Reject a contact operation when the caller is not the record's owner.
fn ensure_owner(contact: &Contact, owner_id: UserId) -> Result<(), ContactError> {
    if contact.owner_id == owner_id {
        Ok(())
    } else {
        Err(ContactError::NotOwner)
    }
}

/// Validate the uploaded file: present, xlsx content type, within the size cap.
fn check_upload(
    file: Option<UploadedFile>,
    max_bytes: usize,
) -> Result<UploadedFile, ContactError> {
    let file = file.ok_or(ContactError::MissingFile)?;

    if file.content_type.as_deref() != Some(XLSX_CONTENT_TYPE) {
        return Err(ContactError::UnsupportedFileType);
    }

    if file.bytes.len() > max_bytes {
        return Err(ContactError::FileTooLarge { max_bytes });
    }

    Ok(file)
}

/// Compute pagination metadata.
fn page_meta(total: i64, page: i64, limit: i64) -> PageMeta {
    PageMeta {
        total,
        // Ceiling division; limit is clamped to >= 1 by the caller.
        total_pages: ((total + limit - 1) / limit).max(1),
        page,
        limit,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use phonebook_core::{Email, MobileNumber};

    fn contact(id: i32, owner: i32) -> Contact {
        let now = Utc::now();
        Contact {
            id: ContactId::new(id),
            name: "contact1".to_owned(),
            email: Email::parse("contact1@test.com").unwrap(),
            mobile_number: MobileNumber::parse("0121234511").unwrap(),
            owner_id: UserId::new(owner),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_ensure_owner_accepts_owner() {
        assert!(ensure_owner(&contact(1, 5), UserId::new(5)).is_ok());
    }

    #[test]
    fn test_ensure_owner_rejects_other_user() {
        assert!(matches!(
            ensure_owner(&contact(1, 5), UserId::new(6)),
            Err(ContactError::NotOwner)
        ));
    }

    #[test]
    fn test_page_meta_fifteen_contacts() {
        // 15 contacts at limit 10: page 1 holds 10, page 2 the remaining 5.
        let meta = page_meta(15, 1, 10);
        assert_eq!(
            meta,
            PageMeta {
                total: 15,
                total_pages: 2,
                page: 1,
                limit: 10
            }
        );
    }

    #[test]
    fn test_page_meta_empty_still_one_page() {
        assert_eq!(page_meta(0, 1, 10).total_pages, 1);
    }

    #[test]
    fn test_page_meta_exact_multiple() {
        assert_eq!(page_meta(20, 2, 10).total_pages, 2);
    }

    #[test]
    fn test_check_upload_missing() {
        assert!(matches!(
            check_upload(None, 1024),
            Err(ContactError::MissingFile)
        ));
    }

    #[test]
    fn test_check_upload_wrong_type() {
        let file = UploadedFile {
            content_type: Some("text/csv".to_owned()),
            bytes: vec![0; 10],
        };
        assert!(matches!(
            check_upload(Some(file), 1024),
            Err(ContactError::UnsupportedFileType)
        ));
    }

    #[test]
    fn test_check_upload_no_declared_type() {
        let file = UploadedFile {
            content_type: None,
            bytes: vec![0; 10],
        };
        assert!(matches!(
            check_upload(Some(file), 1024),
            Err(ContactError::UnsupportedFileType)
        ));
    }

    #[test]
    fn test_check_upload_too_large() {
        let file = UploadedFile {
            content_type: Some(XLSX_CONTENT_TYPE.to_owned()),
            bytes: vec![0; 2048],
        };
        assert!(matches!(
            check_upload(Some(file), 1024),
            Err(ContactError::FileTooLarge { max_bytes: 1024 })
        ));
    }

    #[test]
    fn test_check_upload_order_type_before_size() {
        // Wrong type AND oversized: the declared-type failure wins.
        let file = UploadedFile {
            content_type: Some("text/csv".to_owned()),
            bytes: vec![0; 2048],
        };
        assert!(matches!(
            check_upload(Some(file), 1024),
            Err(ContactError::UnsupportedFileType)
        ));
    }

    #[test]
    fn test_check_upload_accepts_valid() {
        let file = UploadedFile {
            content_type: Some(XLSX_CONTENT_TYPE.to_owned()),
            bytes: vec![0; 512],
        };
        assert!(check_upload(Some(file), 1024).is_ok());
    }
}
