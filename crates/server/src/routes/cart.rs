//! Cart routes.
//!
//! All endpoints require authentication; a user's cart is created lazily on
//! first read.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::dto::CartResponse;
use crate::services::CartService;
use crate::state::AppState;

use super::owner_id;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<String>,
}

/// Line size is carried in the query string for DELETE requests.
#[derive(Debug, Deserialize)]
pub struct LineQuery {
    #[serde(default)]
    pub size: Option<String>,
}

/// GET /api/cart
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.db()).get(owner_id(&user)?).await?;
    Ok(Json(CartResponse::from(cart)))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.db())
        .add_item(owner_id(&user)?, &body.product_id, body.size, body.quantity)
        .await?;
    Ok(Json(CartResponse::from(cart)))
}

/// PUT /api/cart/items/{product_id}
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.db())
        .update_quantity(
            owner_id(&user)?,
            &product_id,
            body.size.as_deref(),
            body.quantity,
        )
        .await?;
    Ok(Json(CartResponse::from(cart)))
}

/// DELETE /api/cart/items/{product_id}
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
    Query(query): Query<LineQuery>,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.db())
        .remove_item(owner_id(&user)?, &product_id, query.size.as_deref())
        .await?;
    Ok(Json(CartResponse::from(cart)))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.db()).clear(owner_id(&user)?).await?;
    Ok(Json(CartResponse::from(cart)))
}
