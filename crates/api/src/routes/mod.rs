//! HTTP route handlers for the phonebook API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Auth
//! POST /auth/registration      - Register and receive an access token
//! POST /auth/login             - Login and receive an access token
//! GET  /auth/user              - Current user (requires bearer token)
//!
//! # Phonebooks (all require bearer token)
//! GET    /phonebooks           - Paginated, searchable contact listing
//! POST   /phonebooks           - Create a contact
//! GET    /phonebooks/{id}      - Fetch one contact
//! PUT    /phonebooks/{id}      - Update a contact
//! DELETE /phonebooks/{id}      - Delete a contact
//! POST   /phonebooks/excel     - Bulk import from an xlsx upload
//! ```

pub mod auth;
pub mod phonebooks;

use axum::{
    Json,
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

/// Standard success envelope: `{"success": true, "data": ...}`.
///
/// Error responses use the mirror shape with `success: false` and an
/// `error` field; see [`crate::error::AppError`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap `data` in a success envelope.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(auth::register))
        .route("/login", post(auth::login))
        .route("/user", get(auth::authenticated_user))
}

/// Create the phonebook routes router.
pub fn phonebook_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(phonebooks::index).post(phonebooks::store))
        .route(
            "/{id}",
            get(phonebooks::show)
                .put(phonebooks::update)
                .delete(phonebooks::destroy),
        )
        .route("/excel", post(phonebooks::upload_excel))
}
