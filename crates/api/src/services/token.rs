//! Bearer token issue and verification.
//!
//! Tokens are HS256-signed JWTs carrying the user id as the `sub` claim and
//! an expiry derived from the configured lifetime. Verification failures are
//! collapsed into two cases (expired vs. invalid); the HTTP layer reports
//! both uniformly as 401.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use phonebook_core::UserId;

/// Errors that can occur when issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's expiry is in the past.
    #[error("token expired")]
    Expired,
    /// The token is missing, malformed, tampered with, or carries bad claims.
    #[error("invalid token")]
    Invalid,
    /// Signing failed (should not happen with an HMAC key).
    #[error("failed to sign token")]
    Signing,
}

/// Claims embedded in an access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id, as a string per JWT convention.
    sub: String,
    /// Issued-at, seconds since the epoch.
    iat: i64,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

/// Issues and verifies bearer tokens with a shared HMAC secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, lifetime: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            lifetime,
        }
    }

    /// Issue a fresh access token bound to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Signing)
    }

    /// Verify a token and recover the embedded user id.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` if the token's expiry has passed, and
    /// `TokenError::Invalid` for any other verification failure.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        let id: i32 = data.claims.sub.parse().map_err(|_| TokenError::Invalid)?;
        Ok(UserId::new(id))
    }
}
