//! Router-level tests for paths that fail before any database work:
//! liveness, missing/invalid bearer tokens, and payload validation.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use phonebook_api::config::ApiConfig;
use phonebook_api::state::AppState;

fn test_app() -> Router {
    let config = ApiConfig {
        database_url: SecretString::from("postgres://localhost/phonebook_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        token_secret: SecretString::from("kJ8#mP2$vN9@qR4!wX7&yB3*zC6^dF1%"),
        token_expiry_secs: 3600,
        max_upload_bytes: 1024 * 1024,
        allowed_origins: vec!["*".to_string()],
        rate_limit_window_secs: 60,
        rate_limit_max: 100,
        sentry_dsn: None,
        sentry_environment: "test".to_string(),
    };

    // Lazy pool: no connection is made until a query runs, and these tests
    // only exercise paths that reject before touching the database.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/phonebook_test")
        .unwrap();

    phonebook_api::app(AppState::new(config, pool))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn listing_without_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/phonebooks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert_eq!(body["error"], "Not authorized to access this route");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::get("/phonebooks/1")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_with_empty_body_lists_every_field() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/auth/registration")
                // Rate limiting keys on the client IP from proxy headers.
                .header("x-forwarded-for", "203.0.113.10")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(false));

    let fields: Vec<&str> = body["error"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);
}

#[tokio::test]
async fn registration_rejects_short_password() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/auth/registration")
                .header("x-forwarded-for", "203.0.113.11")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"name":"user1","email":"user1@test.com","password":"short"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    let messages: Vec<&str> = body["error"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(
        messages,
        vec!["Password must be at least 10 characters."]
    );
}

#[tokio::test]
async fn login_with_malformed_email_is_unprocessable() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/auth/login")
                .header("x-forwarded-for", "203.0.113.12")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"no-at-sign","password":"hunter2hunter2"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(
        body["error"][0]["message"],
        "Email must be a valid email address."
    );
}

#[tokio::test]
async fn excel_upload_without_token_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/phonebooks/excel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
