//! Authentication route handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::user::{SignupRequest, User};
use crate::services::AuthService;
use crate::services::auth::AccessToken;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// `POST /auth/signup` - register a new user.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let auth = AuthService::new(state.pool(), state.config().token_ttl);
    let user = auth.signup(&request).await?;

    tracing::info!(user_id = %user.id, "user signed up");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/login` - exchange phone + password for an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AccessToken>> {
    let auth = AuthService::new(state.pool(), state.config().token_ttl);
    let token = auth.login(&request.phone, &request.password).await?;

    Ok(Json(token))
}

/// `GET /auth/me` - the authenticated caller.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
