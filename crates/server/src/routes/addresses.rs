//! Address route handlers.
//!
//! Every operation is scoped to the authenticated caller; address ids
//! belonging to other users behave as if they did not exist.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use pomelo_core::AddressId;

use crate::db::AddressRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::address::{Address, AddressPayload};
use crate::state::AppState;

/// `POST /address` - create an address for the caller.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AddressPayload>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = AddressRepository::new(state.pool())
        .insert(user.id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// `GET /address/{id}` - get one of the caller's addresses.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .get_for_user(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("address".to_owned()))?;

    Ok(Json(address))
}

/// `PUT /address/{id}` - replace one of the caller's addresses.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<AddressId>,
    Json(payload): Json<AddressPayload>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .update_for_user(id, user.id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("address".to_owned()))?;

    Ok(Json(address))
}

/// `DELETE /address/{id}` - delete one of the caller's addresses.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    let deleted = AddressRepository::new(state.pool())
        .delete_for_user(id, user.id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound("address".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}
