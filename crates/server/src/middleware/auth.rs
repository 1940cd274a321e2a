//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring bearer-token authentication in route
//! handlers. The token only proves a signature; the user document is
//! re-fetched on every request so a deleted or demoted account loses access
//! immediately.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::db::{UserRepository, parse_object_id};
use crate::error::set_sentry_user;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin(pub User);

/// Error returned when authentication fails.
pub enum AuthRejection {
    /// Token missing, malformed, expired, or user no longer exists.
    Unauthorized,
    /// Authenticated but not an admin.
    Forbidden,
    /// User lookup failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Resolve the request's bearer token to a live user document.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AuthRejection> {
    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthRejection::Unauthorized)?;

    let claims = state
        .token_keys()
        .decode(token)
        .map_err(|_| AuthRejection::Unauthorized)?;
    let user_id = parse_object_id(&claims.sub).map_err(|_| AuthRejection::Unauthorized)?;

    let user = UserRepository::new(state.db())
        .get_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "user lookup failed during authentication");
            AuthRejection::Internal
        })?
        .ok_or(AuthRejection::Unauthorized)?;

    set_sentry_user(&claims.sub, Some(user.email.as_ref()));
    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        if !user.is_admin() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request when the token is
/// missing or invalid.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).await.ok()))
    }
}
