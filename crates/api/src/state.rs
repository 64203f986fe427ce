//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::token::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(
            &config.token_secret,
            chrono::Duration::seconds(config.token_expiry_secs),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the access token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
