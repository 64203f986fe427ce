//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PHONEBOOK_DATABASE_URL` - `PostgreSQL` connection string
//! - `PHONEBOOK_TOKEN_SECRET` - Access token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `PHONEBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `PHONEBOOK_PORT` - Listen port (default: 8000)
//! - `PHONEBOOK_TOKEN_EXPIRY_SECS` - Access token lifetime (default: 30 days)
//! - `PHONEBOOK_MAX_UPLOAD_BYTES` - Spreadsheet upload size limit (default: 5 MiB)
//! - `PHONEBOOK_ALLOWED_ORIGINS` - Comma-separated CORS origins (default: `*`)
//! - `PHONEBOOK_RATE_LIMIT_WINDOW_SECS` - Auth rate limit window (default: 60)
//! - `PHONEBOOK_RATE_LIMIT_MAX` - Auth requests allowed per window (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (default: development)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Access token signing secret
    pub token_secret: SecretString,
    /// Access token lifetime in seconds
    pub token_expiry_secs: i64,
    /// Maximum accepted spreadsheet upload size in bytes
    pub max_upload_bytes: usize,
    /// Allowed CORS origins (`*` means any)
    pub allowed_origins: Vec<String>,
    /// Auth endpoint rate limit window in seconds
    pub rate_limit_window_secs: u64,
    /// Auth requests allowed per window per client IP
    pub rate_limit_max: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("PHONEBOOK_DATABASE_URL")?;
        let host = get_env_or_default("PHONEBOOK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PHONEBOOK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PHONEBOOK_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PHONEBOOK_PORT".to_string(), e.to_string()))?;
        let token_secret = get_validated_secret("PHONEBOOK_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "PHONEBOOK_TOKEN_SECRET")?;
        let token_expiry_secs = parse_env_or_default("PHONEBOOK_TOKEN_EXPIRY_SECS", 2_592_000)?;
        let max_upload_bytes = parse_env_or_default("PHONEBOOK_MAX_UPLOAD_BYTES", 5_242_880)?;
        let allowed_origins = parse_origins(&get_env_or_default("PHONEBOOK_ALLOWED_ORIGINS", "*"));
        let rate_limit_window_secs = parse_env_or_default("PHONEBOOK_RATE_LIMIT_WINDOW_SECS", 60)?;
        let rate_limit_max = parse_env_or_default("PHONEBOOK_RATE_LIMIT_MAX", 20)?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_env_or_default("SENTRY_ENVIRONMENT", "development");

        Ok(Self {
            database_url,
            host,
            port,
            token_secret,
            token_expiry_secs,
            max_upload_bytes,
            allowed_origins,
            rate_limit_window_secs,
            rate_limit_max,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether CORS should allow any origin.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into `T`, falling back to a default.
fn parse_env_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate that the token secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
