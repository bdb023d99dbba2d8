//! Integration tests for the stock reservation transaction.
//!
//! These tests require a running `PostgreSQL` database; see the crate docs
//! for setup. They drive [`pomelo_server::services::OrderService`] directly
//! against the database, which is where the interesting invariants live:
//! stock never goes negative, failed orders leave no trace, and line prices
//! are snapshots rather than live references.

use std::time::Duration;

use pomelo_core::ProductId;
use pomelo_integration_tests::{
    order_count_for_user, product_quantity, seed_address, seed_product, seed_user, test_pool,
};
use pomelo_server::cache::ProductCache;
use pomelo_server::models::order::{LineRequest, PlaceOrderRequest};
use pomelo_server::services::{OrderError, OrderService};

fn cache() -> ProductCache {
    ProductCache::new(100, Duration::from_secs(60))
}

fn request(address_id: pomelo_core::AddressId, lines: &[(ProductId, i32)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        address_id,
        lines: lines
            .iter()
            .map(|&(product_id, quantity)| LineRequest {
                product_id,
                quantity,
            })
            .collect(),
    }
}

// ============================================================================
// Atomicity & Rollback
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn insufficient_stock_rolls_back_everything() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "user").await;
    let address = seed_address(&pool, user).await;
    let product = seed_product(&pool, 500, 10).await;

    let cache = cache();
    let service = OrderService::new(&pool, &cache);
    let err = service
        .place_order(user, &request(address, &[(product, 11)]))
        .await
        .expect_err("11 of 10 must fail");

    match err {
        OrderError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 11);
            assert_eq!(available, 10);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // The failed attempt must leave no partial state behind.
    assert_eq!(product_quantity(&pool, product).await, 10);
    assert_eq!(order_count_for_user(&pool, user).await, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn missing_product_rejects_whole_order() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "user").await;
    let address = seed_address(&pool, user).await;
    let real = seed_product(&pool, 500, 10).await;
    let ghost = ProductId::new(i32::MAX);

    let cache = cache();
    let service = OrderService::new(&pool, &cache);
    let err = service
        .place_order(user, &request(address, &[(real, 1), (ghost, 1)]))
        .await
        .expect_err("unknown product must fail");

    assert!(matches!(err, OrderError::ProductNotFound(id) if id == ghost));

    // The existing product must not have been touched.
    assert_eq!(product_quantity(&pool, real).await, 10);
    assert_eq!(order_count_for_user(&pool, user).await, 0);
}

// ============================================================================
// Successful Placement
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn successful_order_decrements_stock_and_snapshots_price() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "user").await;
    let address = seed_address(&pool, user).await;
    let product = seed_product(&pool, 500, 10).await;

    let cache = cache();
    let service = OrderService::new(&pool, &cache);
    let order = service
        .place_order(user, &request(address, &[(product, 4)]))
        .await
        .expect("order should succeed");

    assert_eq!(order.address_id, address);
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].quantity, 4);
    assert_eq!(order.lines[0].price, 500);
    assert_eq!(product_quantity(&pool, product).await, 6);

    // A later price change must not reach back into the placed order.
    sqlx::query("UPDATE product SET price = 900 WHERE id = $1")
        .bind(product.as_i32())
        .execute(&pool)
        .await
        .expect("price update");

    let (line_price,): (i64,) =
        sqlx::query_as("SELECT price FROM order_line WHERE order_id = $1")
            .bind(order.id.as_i32())
            .fetch_one(&pool)
            .await
            .expect("line should exist");
    assert_eq!(line_price, 500);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn duplicate_lines_are_summed_against_stock() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "user").await;
    let address = seed_address(&pool, user).await;

    // 3 + 4 of the same product against 5 in stock: the total of 7 must be
    // validated as one demand, not as two independent lines.
    let short = seed_product(&pool, 500, 5).await;
    let cache = cache();
    let service = OrderService::new(&pool, &cache);
    let err = service
        .place_order(user, &request(address, &[(short, 3), (short, 4)]))
        .await
        .expect_err("7 of 5 must fail");
    assert!(matches!(err, OrderError::InsufficientStock { .. }));
    assert_eq!(product_quantity(&pool, short).await, 5);

    // With 10 in stock the same request succeeds and decrements by 7.
    let stocked = seed_product(&pool, 500, 10).await;
    let order = service
        .place_order(user, &request(address, &[(stocked, 3), (stocked, 4)]))
        .await
        .expect("7 of 10 should succeed");
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].quantity, 7);
    assert_eq!(product_quantity(&pool, stocked).await, 3);
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn address_of_another_user_is_rejected() {
    let pool = test_pool().await;
    let alice = seed_user(&pool, "user").await;
    let bob = seed_user(&pool, "user").await;
    let bobs_address = seed_address(&pool, bob).await;
    let product = seed_product(&pool, 500, 10).await;

    let cache = cache();
    let service = OrderService::new(&pool, &cache);
    let err = service
        .place_order(alice, &request(bobs_address, &[(product, 1)]))
        .await
        .expect_err("foreign address must fail");

    assert!(matches!(err, OrderError::InvalidAddress));
    assert_eq!(product_quantity(&pool, product).await, 10);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn orders_are_visible_only_to_their_owner() {
    let pool = test_pool().await;
    let alice = seed_user(&pool, "user").await;
    let bob = seed_user(&pool, "user").await;
    let address = seed_address(&pool, alice).await;
    let product = seed_product(&pool, 500, 10).await;

    let cache = cache();
    let service = OrderService::new(&pool, &cache);
    let order = service
        .place_order(alice, &request(address, &[(product, 1)]))
        .await
        .expect("order should succeed");

    let repo = pomelo_server::db::OrderRepository::new(&pool);
    assert!(
        repo.get_for_user(order.id, alice)
            .await
            .expect("query")
            .is_some()
    );
    assert!(
        repo.get_for_user(order.id, bob)
            .await
            .expect("query")
            .is_none()
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires PostgreSQL"]
async fn concurrent_orders_never_oversell() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "user").await;
    let address = seed_address(&pool, user).await;
    let product = seed_product(&pool, 500, 5).await;

    // 12 buyers race for 5 units, one unit each. Exactly 5 may win.
    let mut handles = Vec::new();
    for _ in 0..12 {
        let pool = pool.clone();
        let cache = cache();
        handles.push(tokio::spawn(async move {
            let service = OrderService::new(&pool, &cache);
            service
                .place_order(user, &request(address, &[(product, 1)]))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(OrderError::InsufficientStock { .. } | OrderError::Conflict) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(product_quantity(&pool, product).await, 0);
    assert_eq!(order_count_for_user(&pool, user).await, 5);
}
