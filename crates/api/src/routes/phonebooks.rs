//! Phonebook route handlers: CRUD plus bulk xlsx import.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use phonebook_core::ContactId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Contact;
use crate::routes::ApiResponse;
use crate::services::contacts::spreadsheet::SpreadsheetError;
use crate::services::contacts::{ContactError, ContactService, PageMeta, UploadedFile};
use crate::state::AppState;
use crate::validate::{ContactPayload, validate_contact};

/// Query parameters for the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-indexed page number (default 1).
    pub page: Option<i64>,
    /// Page size (default 10, capped at 100).
    pub limit: Option<i64>,
    /// Case-insensitive substring match on name, email, or mobile number.
    pub search: Option<String>,
}

/// Listing envelope: the standard success shape plus pagination metadata.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<Contact>,
    pub meta: PageMeta,
}

/// `GET /phonebooks` - Paginated, searchable listing of the caller's contacts.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let service = ContactService::new(state.pool());
    let (data, meta) = service
        .list(user_id, query.page, query.limit, query.search.as_deref())
        .await?;

    Ok(Json(ListResponse {
        success: true,
        data,
        meta,
    }))
}

/// `GET /phonebooks/{id}` - Fetch one of the caller's contacts.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Contact>>, AppError> {
    let service = ContactService::new(state.pool());
    let contact = service.get(ContactId::new(id), user_id).await?;

    Ok(ApiResponse::ok(contact))
}

/// `POST /phonebooks` - Create a contact owned by the caller.
pub async fn store(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Json(payload): Json<ContactPayload>,
) -> Result<Json<ApiResponse<Contact>>, AppError> {
    let input = validate_contact(&payload).map_err(AppError::Validation)?;

    let service = ContactService::new(state.pool());
    let contact = service.create(input, user_id).await?;

    tracing::info!(contact_id = %contact.id, owner_id = %user_id, "Contact created");

    Ok(ApiResponse::ok(contact))
}

/// `PUT /phonebooks/{id}` - Update a contact.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<i32>,
    Json(payload): Json<ContactPayload>,
) -> Result<Json<ApiResponse<Contact>>, AppError> {
    let input = validate_contact(&payload).map_err(AppError::Validation)?;

    let service = ContactService::new(state.pool());
    let contact = service.update(ContactId::new(id), user_id, input).await?;

    Ok(ApiResponse::ok(contact))
}

/// `DELETE /phonebooks/{id}` - Delete a contact.
///
/// Responds 201 with an empty data object; existing clients depend on that
/// status.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<Value>>), AppError> {
    let service = ContactService::new(state.pool());
    service.delete(ContactId::new(id), user_id).await?;

    tracing::info!(contact_id = id, owner_id = %user_id, "Contact deleted");

    Ok((StatusCode::CREATED, ApiResponse::ok(json!({}))))
}

/// `POST /phonebooks/excel` - Bulk import contacts from an xlsx upload.
///
/// Expects a multipart body with the file under the field name `excel`.
pub async fn upload_excel(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed_upload)? {
        if field.name() != Some("excel") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(malformed_upload)?;

        file = Some(UploadedFile {
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let service = ContactService::new(state.pool());
    service
        .import_spreadsheet(file, user_id, state.config().max_upload_bytes)
        .await?;

    tracing::info!(owner_id = %user_id, "Contacts imported from spreadsheet");

    Ok(ApiResponse::ok(json!({})))
}

/// Map an unreadable multipart body to the spreadsheet-upload error (400).
fn malformed_upload(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Contact(ContactError::Spreadsheet(SpreadsheetError::Workbook(
        err.to_string(),
    )))
}
