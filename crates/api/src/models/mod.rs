//! Domain models.
//!
//! These types represent validated domain objects separate from database row types.

pub mod contact;
pub mod user;

pub use contact::{Contact, NewContact};
pub use user::User;
