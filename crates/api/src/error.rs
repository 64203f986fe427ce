//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every failure leaves as the same JSON
//! envelope: `{"success": false, "error": <message or field list>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::contacts::ContactError;
use crate::validate::FieldError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request payload failed field validation.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Contact operation failed.
    #[error("contact error: {0}")]
    Contact(#[from] ContactError),

    /// Missing/malformed/expired bearer token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Database operation failed outside a service.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is the server's fault (5xx).
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_)
            ),
            Self::Contact(err) => matches!(err, ContactError::Repository(_)),
            Self::Validation(_) | Self::Unauthenticated(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Auth(err) => match err {
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Contact(err) => match err {
                ContactError::AlreadyExists | ContactError::DuplicateField => StatusCode::CONFLICT,
                ContactError::NotFound => StatusCode::NOT_FOUND,
                ContactError::NotOwner => StatusCode::FORBIDDEN,
                ContactError::MissingFile
                | ContactError::UnsupportedFileType
                | ContactError::FileTooLarge { .. }
                | ContactError::Spreadsheet(_) => StatusCode::BAD_REQUEST,
                ContactError::InvalidRow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ContactError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error` value of the response envelope.
    ///
    /// Validation failures carry the field-error list; everything else is a
    /// single message. Internal details never reach the client.
    fn error_value(&self) -> Value {
        match self {
            Self::Validation(errors) => json!(errors),
            Self::Auth(err) => match err {
                AuthError::EmailTaken => json!("Email already exist."),
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    json!("Invalid credentials")
                }
                _ => json!("Internal server error"),
            },
            Self::Contact(err) => match err {
                ContactError::AlreadyExists => json!("Phonebook already exist."),
                ContactError::DuplicateField => {
                    json!("The email or mobile number you want to update already exist.")
                }
                ContactError::NotFound => json!("Phonebook not found"),
                ContactError::NotOwner => {
                    json!("The phonebook you want to update belongs to other user.")
                }
                ContactError::MissingFile => {
                    json!("Please select the phonebook excel file you want to upload")
                }
                ContactError::UnsupportedFileType => {
                    json!("The file you want to upload must be an excel file")
                }
                ContactError::FileTooLarge { max_bytes } => {
                    json!(format!("Please upload file less than {max_bytes} bytes"))
                }
                ContactError::Spreadsheet(_) => {
                    json!("Failed to upload the phonebook excel file")
                }
                ContactError::InvalidRow { row, errors } => json!(
                    errors
                        .iter()
                        .map(|e| FieldError {
                            field: e.field.clone(),
                            message: format!("Row {row}: {}", e.message),
                        })
                        .collect::<Vec<_>>()
                ),
                ContactError::Repository(_) => json!("Internal server error"),
            },
            Self::Unauthenticated(message) => json!(message),
            Self::Database(_) | Self::Internal(_) => json!("Internal server error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({
            "success": false,
            "error": self.error_value(),
        });

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.status()
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::EmailTaken)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_contact_status_codes() {
        assert_eq!(
            status_of(AppError::Contact(ContactError::AlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Contact(ContactError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Contact(ContactError::NotOwner)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Contact(ContactError::MissingFile)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Contact(ContactError::FileTooLarge {
                max_bytes: 1024
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_is_unprocessable() {
        assert_eq!(
            status_of(AppError::Validation(vec![])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_login_failures_share_a_message() {
        // No user-enumeration: unknown email and wrong password are identical.
        let unknown = AppError::Auth(AuthError::InvalidCredentials).error_value();
        let wrong = AppError::Auth(AuthError::InvalidCredentials).error_value();
        assert_eq!(unknown, wrong);
        assert_eq!(unknown, json!("Invalid credentials"));
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::Internal("connection pool exhausted".to_owned());
        assert_eq!(err.error_value(), json!("Internal server error"));
    }

    #[test]
    fn test_invalid_row_names_the_row() {
        let err = AppError::Contact(ContactError::InvalidRow {
            row: 4,
            errors: vec![FieldError {
                field: "email".to_owned(),
                message: "Email must be a valid email address.".to_owned(),
            }],
        });
        let value = err.error_value();
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(
            list[0]["message"],
            "Row 4: Email must be a valid email address."
        );
    }
}
