//! Order placement and stock reservation.
//!
//! The one entry point is [`OrderService::place_order`]. Its contract:
//!
//! 1. Verify the shipping address belongs to the caller.
//! 2. Validate the requested lines in memory (non-empty, positive
//!    quantities), summing duplicate product ids so a product split across
//!    lines cannot slip past the stock check.
//! 3. Open a transaction and batch-fetch the requested products with row
//!    locks, in id order.
//! 4. Reject the whole order if any product is missing or short on stock.
//! 5. Snapshot each product's current price onto its line; the client
//!    never dictates price.
//! 6. Decrement stock, insert the order header and its lines, and commit.
//!    Everything before the commit is invisible to other transactions and
//!    rolls back as one unit on any failure.
//!
//! Steps 1-2 are side-effect free. The transaction in steps 3-6 is the sole
//! effectful boundary: under concurrent orders against the same product the
//! row locks serialize the decrements, so stock can never go negative no
//! matter the interleaving. A serialization failure rolls the attempt back
//! and is retried from the re-read a bounded number of times.

mod error;

pub use error::OrderError;

use std::collections::{BTreeMap, HashMap};

use sqlx::PgPool;

use pomelo_core::{AddressId, ProductId, UserId};

use crate::cache::ProductCache;
use crate::db::orders::NewOrderLine;
use crate::db::{AddressRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::models::order::{LineRequest, Order, PlaceOrderRequest, ProductSummary};

/// How many times a reservation is re-attempted after a write conflict
/// before giving up with [`OrderError::Conflict`].
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Order placement service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    cache: &'a ProductCache,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a ProductCache) -> Self {
        Self { pool, cache }
    }

    /// Place an order for the given user, reserving stock atomically.
    ///
    /// Returns the fully populated order, each line carrying the price
    /// snapshotted inside the reservation transaction.
    ///
    /// # Errors
    ///
    /// See [`OrderError`]. No side effects remain after any error.
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: &PlaceOrderRequest,
    ) -> Result<Order, OrderError> {
        let addresses = AddressRepository::new(self.pool);
        if !addresses
            .exists_for_user(request.address_id, user_id)
            .await?
        {
            return Err(OrderError::InvalidAddress);
        }

        let demand = aggregate_lines(&request.lines)?;

        let mut attempt = 0;
        let order = loop {
            attempt += 1;
            match self.reserve_and_commit(request.address_id, &demand).await {
                Err(OrderError::Repository(RepositoryError::Serialization)) => {
                    if attempt >= MAX_COMMIT_ATTEMPTS {
                        return Err(OrderError::Conflict);
                    }
                    tracing::warn!(attempt, "stock reservation conflict, retrying");
                }
                Err(other) => return Err(other),
                Ok(order) => break order,
            }
        };

        // Stock changed; drop stale cache entries for the touched products.
        for &product_id in demand.keys() {
            self.cache.invalidate(product_id).await;
        }

        tracing::info!(
            order_id = %order.id,
            lines = order.lines.len(),
            "order placed"
        );

        Ok(order)
    }

    /// One reservation attempt: lock, validate, decrement, insert, commit.
    ///
    /// Dropping the transaction on any early return rolls the attempt back
    /// in full.
    async fn reserve_and_commit(
        &self,
        address_id: AddressId,
        demand: &BTreeMap<ProductId, i32>,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // BTreeMap keys come out sorted, so locks are taken in id order.
        let ids: Vec<ProductId> = demand.keys().copied().collect();
        let products = ProductRepository::fetch_for_update(&mut tx, &ids).await?;
        let products: HashMap<ProductId, _> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let mut lines = Vec::with_capacity(demand.len());
        for (&product_id, &quantity) in demand {
            let Some(product) = products.get(&product_id) else {
                return Err(OrderError::ProductNotFound(product_id));
            };
            if product.quantity < quantity {
                return Err(OrderError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available: product.quantity,
                });
            }
            lines.push(NewOrderLine {
                product_id,
                quantity,
                // Price snapshot from the locked row, not from the client.
                price: product.price,
                product: ProductSummary {
                    category: product.category.clone(),
                    info: product.info.clone(),
                },
            });
        }

        for (&product_id, &quantity) in demand {
            ProductRepository::decrement_quantity(&mut tx, product_id, quantity).await?;
        }

        let order = OrderRepository::insert_with_lines(&mut tx, address_id, lines).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(order)
    }
}

/// Collapse requested lines into per-product demand.
///
/// Duplicate product ids are summed, so stock validation always sees the
/// total requested quantity per product. The `BTreeMap` keeps product ids
/// sorted, which later fixes the row-lock order.
fn aggregate_lines(lines: &[LineRequest]) -> Result<BTreeMap<ProductId, i32>, OrderError> {
    if lines.is_empty() {
        return Err(OrderError::Validation(
            "order must contain at least one line".to_owned(),
        ));
    }

    let mut demand: BTreeMap<ProductId, i32> = BTreeMap::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "quantity must be positive for product {}",
                line.product_id
            )));
        }
        let total = demand.entry(line.product_id).or_insert(0);
        *total = total.checked_add(line.quantity).ok_or_else(|| {
            OrderError::Validation(format!(
                "total quantity overflows for product {}",
                line.product_id
            ))
        })?;
    }

    Ok(demand)
}
