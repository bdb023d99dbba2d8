//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (DB ping)
//!
//! # Auth
//! POST   /auth/signup          - Register a new user
//! POST   /auth/login           - Exchange phone+password for a token
//! GET    /auth/me              - Current user
//!
//! # Addresses (authenticated, caller-scoped)
//! POST   /address              - Create address
//! GET    /address/{id}         - Get address
//! PUT    /address/{id}         - Replace address
//! DELETE /address/{id}         - Delete address
//!
//! # Products (reads public, writes admin-scoped)
//! POST   /product              - Create product
//! GET    /product              - List products (?page=N)
//! GET    /product/{id}         - Get product (cache-aside)
//! PUT    /product/{id}         - Replace product
//! DELETE /product/{id}         - Delete product
//!
//! # Orders (authenticated)
//! POST   /order                - Place an order (stock reservation)
//! GET    /order/{id}           - Get one of the caller's orders
//! ```

pub mod addresses;
pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(addresses::create))
        .route(
            "/{id}",
            get(addresses::show)
                .put(addresses::update)
                .delete(addresses::delete),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::index))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/{id}", get(orders::show))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/address", address_routes())
        .nest("/product", product_routes())
        .nest("/order", order_routes())
}
