//! Auth route handlers: registration, login, current user.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::routes::ApiResponse;
use crate::services::auth::{AuthService, AuthenticatedUser};
use crate::state::AppState;
use crate::validate::{LoginPayload, RegisterPayload, validate_login, validate_register};

/// A user plus their freshly issued access token, as returned by
/// registration and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: User,
    pub access_token: String,
}

impl From<AuthenticatedUser> for AuthResponse {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            user: auth.user,
            access_token: auth.access_token,
        }
    }
}

/// `POST /auth/registration` - Create an account and issue a token.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let input = validate_register(&payload).map_err(AppError::Validation)?;

    let service = AuthService::new(state.pool(), state.tokens());
    let authenticated = service.register(input).await?;

    tracing::info!(user_id = %authenticated.user.id, "User registered");

    Ok(ApiResponse::ok(authenticated.into()))
}

/// `POST /auth/login` - Authenticate and issue a token.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let input = validate_login(&payload).map_err(AppError::Validation)?;

    let service = AuthService::new(state.pool(), state.tokens());
    let authenticated = service.login(&input.email, &input.password).await?;

    tracing::info!(user_id = %authenticated.user.id, "User logged in");

    Ok(ApiResponse::ok(authenticated.into()))
}

/// `GET /auth/user` - The user behind the presented bearer token.
pub async fn authenticated_user(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let service = AuthService::new(state.pool(), state.tokens());
    let user = service.get_user(user_id).await?;

    Ok(ApiResponse::ok(user))
}
