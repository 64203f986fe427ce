//! Core types for the phonebook API.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod mobile;

pub use email::{Email, EmailError};
pub use id::*;
pub use mobile::{MobileNumber, MobileNumberError};
