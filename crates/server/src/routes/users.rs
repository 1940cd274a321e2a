//! User profile, wishlist, address, and admin user-management routes.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use marigold_core::{Address, Role};

use crate::db::{ProductRepository, UserRepository, parse_object_id};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::UserProfile;
use crate::models::dto::ProductResponse;
use crate::services::auth::{hash_password, validate_password};
use crate::state::AppState;

use super::owner_id;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// GET /api/users/profile
pub async fn profile(RequireAuth(user): RequireAuth) -> Result<Json<UserProfile>> {
    Ok(Json(user.profile()))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    let id = owner_id(&user)?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    let password_hash = match body.password.as_deref() {
        Some(password) => {
            validate_password(password).map_err(AppError::Auth)?;
            Some(hash_password(password).map_err(AppError::Auth)?)
        }
        None => None,
    };

    let repo = UserRepository::new(state.db());
    repo.update_profile(id, name, password_hash.as_deref())
        .await?;
    let updated = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;
    Ok(Json(updated.profile()))
}

/// GET /api/users/wishlist
///
/// Resolves the saved product references; deleted products are skipped.
pub async fn wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.db())
        .find_by_ids(&user.wishlist)
        .await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

/// POST /api/users/wishlist/{product_id}
pub async fn wishlist_add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let product = parse_object_id(&product_id)?;
    // Only existing products may be wishlisted.
    ProductRepository::new(state.db())
        .get_by_id(product)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    UserRepository::new(state.db())
        .wishlist_add(owner_id(&user)?, product)
        .await?;
    Ok(Json(serde_json::json!({ "message": "added to wishlist" })))
}

/// DELETE /api/users/wishlist/{product_id}
pub async fn wishlist_remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let product = parse_object_id(&product_id)?;
    UserRepository::new(state.db())
        .wishlist_remove(owner_id(&user)?, product)
        .await?;
    Ok(Json(
        serde_json::json!({ "message": "removed from wishlist" }),
    ))
}

/// POST /api/users/addresses
pub async fn address_add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(address): Json<Address>,
) -> Result<Json<UserProfile>> {
    address.validate().map_err(AppError::BadRequest)?;
    let id = owner_id(&user)?;

    let repo = UserRepository::new(state.db());
    repo.address_add(id, &address).await?;
    let updated = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;
    Ok(Json(updated.profile()))
}

/// PUT /api/users/addresses/{index}
pub async fn address_update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(index): Path<usize>,
    Json(address): Json<Address>,
) -> Result<Json<UserProfile>> {
    address.validate().map_err(AppError::BadRequest)?;
    let id = owner_id(&user)?;

    let repo = UserRepository::new(state.db());
    repo.address_update(id, index, &address).await?;
    let updated = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;
    Ok(Json(updated.profile()))
}

/// DELETE /api/users/addresses/{index}
pub async fn address_remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(index): Path<usize>,
) -> Result<Json<UserProfile>> {
    let id = owner_id(&user)?;
    let repo = UserRepository::new(state.db());
    repo.address_remove(id, index).await?;
    let updated = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;
    Ok(Json(updated.profile()))
}

/// GET /api/users (admin)
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserProfile>>> {
    let users = UserRepository::new(state.db()).list().await?;
    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// PUT /api/users/{id}/role (admin)
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_object_id(&id)?;
    if admin.id == Some(id) {
        return Err(AppError::BadRequest(
            "cannot change your own role".to_string(),
        ));
    }

    UserRepository::new(state.db()).update_role(id, body.role).await?;
    tracing::info!(user = %id.to_hex(), role = ?body.role, "role updated");
    Ok(Json(serde_json::json!({ "message": "role updated" })))
}

/// DELETE /api/users/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_object_id(&id)?;
    if admin.id == Some(id) {
        return Err(AppError::BadRequest(
            "cannot delete your own account".to_string(),
        ));
    }

    if !UserRepository::new(state.db()).delete(id).await? {
        return Err(AppError::NotFound("user".to_string()));
    }
    tracing::info!(user = %id.to_hex(), "user deleted");
    Ok(Json(serde_json::json!({ "message": "user deleted" })))
}
