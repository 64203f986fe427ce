//! Contact service error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::contacts::spreadsheet::SpreadsheetError;
use crate::validate::FieldError;

/// Errors that can occur during contact operations.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The owner already has a contact with this email or mobile number.
    #[error("contact already exists")]
    AlreadyExists,

    /// Another contact of the same owner already uses the target email or
    /// mobile number (update path).
    #[error("email or mobile number already in use")]
    DuplicateField,

    /// No contact with this ID (for this owner, where ownership is folded
    /// into the lookup).
    #[error("contact not found")]
    NotFound,

    /// The contact exists but belongs to another user.
    #[error("contact belongs to another user")]
    NotOwner,

    /// No file was attached to the import request.
    #[error("no file uploaded")]
    MissingFile,

    /// The uploaded file's declared content type is not xlsx.
    #[error("unsupported file type")]
    UnsupportedFileType,

    /// The uploaded file exceeds the configured size limit.
    #[error("file larger than {max_bytes} bytes")]
    FileTooLarge {
        /// Configured maximum in bytes.
        max_bytes: usize,
    },

    /// The workbook could not be read.
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    /// A data row failed field validation; aborts the whole import.
    #[error("row {row} failed validation")]
    InvalidRow {
        /// 1-based row number in the source file.
        row: usize,
        /// The field-level failures for that row.
        errors: Vec<FieldError>,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
