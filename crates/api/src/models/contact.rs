//! Contact domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use phonebook_core::{ContactId, Email, MobileNumber, UserId};

/// A phonebook contact (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    /// Unique contact ID.
    pub id: ContactId,
    /// Contact's display name.
    pub name: String,
    /// Contact's email address (unique among the owner's contacts).
    pub email: Email,
    /// Contact's mobile number (unique among the owner's contacts).
    pub mobile_number: MobileNumber,
    /// User who owns this contact.
    pub owner_id: UserId,
    /// When the contact was created.
    pub created_at: DateTime<Utc>,
    /// When the contact was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validated contact fields for create/update/import.
///
/// Produced only by the validation layer, so a `NewContact` always carries
/// well-formed values.
#[derive(Debug, Clone)]
pub struct NewContact {
    /// Contact's display name.
    pub name: String,
    /// Contact's email address.
    pub email: Email,
    /// Contact's mobile number.
    pub mobile_number: MobileNumber,
}
