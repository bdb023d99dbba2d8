//! Order route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use pomelo_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::order::{Order, PlaceOrderRequest};
use crate::services::OrderService;
use crate::state::AppState;

/// `POST /order` - place an order, reserving stock atomically.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let service = OrderService::new(state.pool(), state.product_cache());
    let order = service.place_order(user.id, &request).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /order/{id}` - get one of the caller's orders.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_owned()))?;

    Ok(Json(order))
}
