//! Authentication middleware and extractors.
//!
//! Provides an extractor for requiring a valid bearer access token in route
//! handlers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use phonebook_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// The token is verified against the signing secret and the caller's user id
/// is extracted from it. Handlers never see the raw token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user_id): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
pub struct RequireAuth(pub UserId);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthenticated("Not authorized to access this route".to_string())
            })?;

        let user_id = state.tokens().verify(token).map_err(|err| {
            tracing::debug!(error = %err, "Rejected bearer token");
            AppError::Unauthenticated("Not authorized to access this route".to_string())
        })?;

        Ok(Self(user_id))
    }
}
