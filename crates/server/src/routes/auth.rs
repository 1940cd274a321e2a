//! Authentication routes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{Result, set_sentry_user};
use crate::middleware::RequireAuth;
use crate::models::UserProfile;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus profile, returned by both register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.db(), state.token_keys());
    let (user, token) = auth
        .register(&body.name, &body.email, &body.password)
        .await?;

    set_sentry_user(&user.profile().id, Some(user.email.as_ref()));
    tracing::info!(email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.db(), state.token_keys());
    let (user, token) = auth.login(&body.email, &body.password).await?;

    set_sentry_user(&user.profile().id, Some(user.email.as_ref()));
    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

/// GET /api/auth/me
///
/// The extractor already re-fetched the user, so this just projects it.
pub async fn me(RequireAuth(user): RequireAuth) -> Result<Json<UserProfile>> {
    Ok(Json(user.profile()))
}
