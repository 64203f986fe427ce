//! Request payload validation.
//!
//! Each operation has a typed raw payload and an explicit validation
//! function that either produces validated input types or a list of
//! field-level errors. All fields are checked (no short-circuit between
//! fields) so the client sees every problem at once, and string inputs are
//! trimmed before validation.

use serde::{Deserialize, Serialize};

use phonebook_core::{Email, MobileNumber};

use crate::models::NewContact;

/// Minimum password length for registration.
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raw registration payload as received over the wire.
///
/// Missing fields default to empty strings so they surface as validation
/// errors rather than body-deserialization failures.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated registration input.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: Email,
    pub password: String,
}

/// Raw login payload.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated login input.
#[derive(Debug)]
pub struct LoginInput {
    pub email: Email,
    pub password: String,
}

/// Raw contact payload, shared by create and update.
#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile_number: String,
}

/// Validate a registration payload.
///
/// # Errors
///
/// Returns every field-level failure: empty name, missing/malformed email,
/// missing/short password.
pub fn validate_register(payload: &RegisterPayload) -> Result<RegisterInput, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = payload.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required."));
    }

    let email = validate_email_field(&payload.email, &mut errors);

    let password = payload.password.trim();
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required."));
    } else if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
        ));
    }

    match (email, errors.is_empty()) {
        (Some(email), true) => Ok(RegisterInput {
            name: name.to_owned(),
            email,
            password: password.to_owned(),
        }),
        _ => Err(errors),
    }
}

/// Validate a login payload.
///
/// # Errors
///
/// Returns field-level failures for a missing/malformed email or a missing
/// password. Password length is deliberately not checked here.
pub fn validate_login(payload: &LoginPayload) -> Result<LoginInput, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = validate_email_field(&payload.email, &mut errors);

    let password = payload.password.trim();
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required."));
    }

    match (email, errors.is_empty()) {
        (Some(email), true) => Ok(LoginInput {
            email,
            password: password.to_owned(),
        }),
        _ => Err(errors),
    }
}

/// Validate a contact payload (create/update body).
///
/// # Errors
///
/// Returns every field-level failure across name, email, and mobile number.
pub fn validate_contact(payload: &ContactPayload) -> Result<NewContact, Vec<FieldError>> {
    validate_contact_fields(&payload.name, &payload.email, &payload.mobile_number)
}

/// Validate raw contact fields.
///
/// Shared by the JSON body path and the spreadsheet import path, so an
/// imported row is held to exactly the same rules as a direct create.
///
/// # Errors
///
/// Returns every field-level failure across name, email, and mobile number.
pub fn validate_contact_fields(
    name: &str,
    email: &str,
    mobile_number: &str,
) -> Result<NewContact, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required."));
    }

    let email = validate_email_field(email, &mut errors);

    let mobile = mobile_number.trim();
    let mobile = if mobile.is_empty() {
        errors.push(FieldError::new(
            "mobile_number",
            "Mobile number is required.",
        ));
        None
    } else {
        match MobileNumber::parse(mobile) {
            Ok(mobile) => Some(mobile),
            Err(_) => {
                errors.push(FieldError::new(
                    "mobile_number",
                    "Mobile number must be a valid format",
                ));
                None
            }
        }
    };

    match (email, mobile, errors.is_empty()) {
        (Some(email), Some(mobile_number), true) => Ok(NewContact {
            name: name.to_owned(),
            email,
            mobile_number,
        }),
        _ => Err(errors),
    }
}

/// Shared email-field check: required, then well-formed.
fn validate_email_field(raw: &str, errors: &mut Vec<FieldError>) -> Option<Email> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new("email", "Email is required."));
        return None;
    }

    match Email::parse(trimmed) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.push(FieldError::new(
                "email",
                "Email must be a valid email address.",
            ));
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_register_valid() {
        let input = validate_register(&RegisterPayload {
            name: "  Alice  ".to_owned(),
            email: "alice@example.com".to_owned(),
            password: "longenoughpassword".to_owned(),
        })
        .unwrap();
        assert_eq!(input.name, "Alice");
        assert_eq!(input.email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_register_collects_all_errors() {
        let errors = validate_register(&RegisterPayload {
            name: String::new(),
            email: "not-an-email".to_owned(),
            password: "short".to_owned(),
        })
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "email", "password"]);
    }

    #[test]
    fn test_register_password_minimum() {
        let errors = validate_register(&RegisterPayload {
            name: "Alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password: "123456789".to_owned(), // 9 chars
        })
        .unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new(
                "password",
                "Password must be at least 10 characters."
            )]
        );
    }

    #[test]
    fn test_login_requires_password_but_not_length() {
        assert!(
            validate_login(&LoginPayload {
                email: "alice@example.com".to_owned(),
                password: "x".to_owned(),
            })
            .is_ok()
        );

        let errors = validate_login(&LoginPayload {
            email: "alice@example.com".to_owned(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["password"]);
    }

    #[test]
    fn test_contact_valid() {
        let contact =
            validate_contact_fields("contact1", "contact1@test.com", "0121234511").unwrap();
        assert_eq!(contact.name, "contact1");
        assert_eq!(contact.mobile_number.as_str(), "0121234511");
    }

    #[test]
    fn test_contact_bad_mobile_message() {
        let errors =
            validate_contact_fields("contact1", "contact1@test.com", "99999").unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new(
                "mobile_number",
                "Mobile number must be a valid format"
            )]
        );
    }

    #[test]
    fn test_contact_all_missing() {
        let errors = validate_contact_fields("", "", "").unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "email", "mobile_number"]);
    }
}
