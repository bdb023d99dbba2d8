//! Product catalog route handlers.
//!
//! Reads are public and go through the cache-aside path; writes require the
//! `admin` scope and keep the cache coherent.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use pomelo_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{Product, ProductPayload};
use crate::state::AppState;

/// Page size for product listings.
const PAGE_SIZE: i64 = 10;

/// Query parameters for `GET /product`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
}

const fn default_page() -> i64 {
    1
}

/// `POST /product` - create a product (admin only).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_payload(&payload)?;

    let product = ProductRepository::new(state.pool()).insert(&payload).await?;
    state.product_cache().insert(product.clone()).await;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /product/{id}` - get a product, cache-aside.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    if let Some(product) = state.product_cache().get(id).await {
        return Ok(Json(product));
    }

    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    state.product_cache().insert(product.clone()).await;
    Ok(Json(product))
}

/// `GET /product?page=N` - list products, newest first.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>> {
    let page = params.page.max(1);
    let offset = (page - 1) * PAGE_SIZE;

    let products = ProductRepository::new(state.pool())
        .list(PAGE_SIZE, offset)
        .await?;

    Ok(Json(products))
}

/// `PUT /product/{id}` - replace a product (admin only).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    validate_payload(&payload)?;

    let product = ProductRepository::new(state.pool())
        .update(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    state.product_cache().insert(product.clone()).await;
    Ok(Json(product))
}

/// `DELETE /product/{id}` - delete a product (admin only).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    // Evict before the delete so a concurrent read cannot re-cache the row.
    state.product_cache().invalidate(id).await;

    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("product".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Validate catalog write payloads.
fn validate_payload(payload: &ProductPayload) -> Result<()> {
    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".to_owned()));
    }
    if payload.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_owned(),
        ));
    }
    if payload.category.trim().is_empty() {
        return Err(AppError::BadRequest("category must not be empty".to_owned()));
    }
    Ok(())
}
