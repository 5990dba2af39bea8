//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::auth::TokenKeys;
use crate::services::payments::{PaymentGateway, SandboxGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    tokens: TokenKeys,
    payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Create a new application state backed by the sandbox payment gateway.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let payments = Arc::new(SandboxGateway::new(config.payment.sandbox_url.clone()));
        Self::with_gateway(config, pool, payments)
    }

    /// Create a new application state with an explicit payment gateway.
    #[must_use]
    pub fn with_gateway(
        config: StorefrontConfig,
        pool: PgPool,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let tokens = TokenKeys::new(&config.token_secret);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                payments,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the session token keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Get the payment gateway.
    #[must_use]
    pub fn payments(&self) -> &dyn PaymentGateway {
        self.inner.payments.as_ref()
    }
}
