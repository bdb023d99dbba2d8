//! Authentication extractors.
//!
//! Route handlers declare their auth requirement by taking [`CurrentUser`]
//! (any authenticated caller) or [`RequireAdmin`] (caller with the `admin`
//! scope) as an argument. Both resolve the `X-API-Key` header to a user via
//! the token store.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     CurrentUser(user): CurrentUser,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", user.first_name)
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::models::user::User;
use crate::services::AuthService;
use crate::state::AppState;

/// The HTTP header carrying the access token.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor that requires an authenticated caller.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing X-API-Key header".to_owned()))?;

        let auth = AuthService::new(state.pool(), state.config().token_ttl);
        let user = auth
            .resolve_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extractor that additionally requires the `admin` scope.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.has_scope("admin") {
            return Err(AppError::Forbidden("admin scope required".to_owned()));
        }
        Ok(Self(user))
    }
}
