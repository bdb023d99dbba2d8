//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::ProductCache;
use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the configuration, the
/// database pool and the product cache. Constructed once at startup, so
/// nothing in here is a process-wide singleton.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    product_cache: ProductCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let product_cache =
            ProductCache::new(config.product_cache_capacity, config.product_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                product_cache,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the product cache.
    #[must_use]
    pub fn product_cache(&self) -> &ProductCache {
        &self.inner.product_cache
    }
}
