//! In-process product cache.
//!
//! Cache-aside over product reads: `GET /product/{id}` checks here first and
//! populates on miss. Catalog writes and successful order commits invalidate
//! the touched entries, so a cached product is never more stale than the TTL
//! even if an invalidation is missed.

use std::time::Duration;

use moka::future::Cache;

use pomelo_core::ProductId;

use crate::models::product::Product;

/// TTL-bounded cache of products keyed by id.
#[derive(Clone)]
pub struct ProductCache {
    inner: Cache<ProductId, Product>,
}

impl ProductCache {
    /// Create a cache holding at most `capacity` products for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Look up a cached product.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        self.inner.get(&id).await
    }

    /// Insert or refresh a product.
    pub async fn insert(&self, product: Product) {
        self.inner.insert(product.id, product).await;
    }

    /// Drop a product from the cache (after a write made it stale).
    pub async fn invalidate(&self, id: ProductId) {
        self.inner.invalidate(&id).await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(id: i32, quantity: i32) -> Product {
        Product {
            id: ProductId::new(id),
            category: "fruit".to_owned(),
            info: serde_json::json!({"name": "pomelo"}),
            price: 500,
            quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_returns_inserted_product() {
        let cache = ProductCache::new(10, Duration::from_secs(60));
        cache.insert(product(1, 5)).await;

        let hit = cache.get(ProductId::new(1)).await.expect("cached");
        assert_eq!(hit.quantity, 5);
        assert!(cache.get(ProductId::new(2)).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = ProductCache::new(10, Duration::from_secs(60));
        cache.insert(product(1, 5)).await;
        cache.invalidate(ProductId::new(1)).await;

        assert!(cache.get(ProductId::new(1)).await.is_none());
    }
}
