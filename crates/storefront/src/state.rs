//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{CatalogRepository, OrderRepository, UserRepository};
use crate::services::{AuthService, CatalogService, OrderService};

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
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
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

    /// Catalog service backed by `PostgreSQL`.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<CatalogRepository<'_>> {
        CatalogService::new(CatalogRepository::new(self.pool()))
    }

    /// Order service backed by `PostgreSQL`, using the configured order rules.
    #[must_use]
    pub fn orders(&self) -> OrderService<OrderRepository<'_>, CatalogRepository<'_>> {
        OrderService::new(
            OrderRepository::new(self.pool()),
            CatalogRepository::new(self.pool()),
            self.config().orders,
        )
    }

    /// Auth service backed by `PostgreSQL`.
    #[must_use]
    pub fn auth(&self) -> AuthService<UserRepository<'_>> {
        AuthService::new(UserRepository::new(self.pool()))
    }
}
