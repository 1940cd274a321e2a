//! Order routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use marigold_core::{Address, OrderStatus, PaymentMethod, PaymentStatus};

use crate::db::{OrderRepository, parse_object_id};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::dto::OrderResponse;
use crate::services::checkout::{CheckoutService, OrderLine};
use crate::services::razorpay::GatewayOrder;
use crate::state::AppState;

use super::owner_id;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
}

/// Response to POST /api/orders.
///
/// COD orders are final immediately; online orders return the gateway order
/// for the client SDK and are created later by the verify step.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlaceOrderResponse {
    Placed {
        order: OrderResponse,
    },
    AwaitingPayment {
        gateway_order: GatewayOrder,
        /// Public key id the client SDK needs.
        key_id: String,
    },
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>> {
    let user_id = owner_id(&user)?;
    let checkout = CheckoutService::new(state.client(), state.db(), state.razorpay().clone());

    match body.payment_method {
        PaymentMethod::Cod => {
            let order = checkout
                .place_cod_order(user_id, &body.items, body.shipping_address)
                .await?;
            Ok(Json(PlaceOrderResponse::Placed {
                order: OrderResponse::from(order),
            }))
        }
        PaymentMethod::Online => {
            let gateway_order = checkout
                .begin_online_order(user_id, &body.items, &body.shipping_address)
                .await?;
            Ok(Json(PlaceOrderResponse::AwaitingPayment {
                gateway_order,
                key_id: state.razorpay().key_id().to_owned(),
            }))
        }
    }
}

/// GET /api/orders/mine
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = OrderRepository::new(state.db())
        .list_by_user(owner_id(&user)?)
        .await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<i64>,
}

/// GET /api/orders (admin)
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = OrderRepository::new(state.db())
        .list_all(
            query.status,
            query.skip,
            query
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        )
        .await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /api/orders/{id}
///
/// Owner or admin only.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>> {
    let id = parse_object_id(&id)?;
    let order = OrderRepository::new(state.db())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    if !user.is_admin() && Some(order.user) != user.id {
        // Hide the order's existence from other users.
        return Err(AppError::NotFound("order".to_string()));
    }
    Ok(Json(OrderResponse::from(order)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PUT /api/orders/{id}/status (admin)
///
/// Transitions follow the fixed enum table. `Delivered` marks a pending COD
/// payment paid; `Cancelled` returns stock to the shelves in the same
/// transaction as the status write.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let id = parse_object_id(&id)?;
    let repo = OrderRepository::new(state.db());
    let order = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;

    if !order.order_status.can_transition_to(body.status) {
        return Err(AppError::BadRequest(format!(
            "cannot transition from {} to {}",
            order.order_status, body.status
        )));
    }

    let payment_status = match body.status {
        OrderStatus::Delivered
            if order.payment_method == PaymentMethod::Cod
                && order.payment_status == PaymentStatus::Pending =>
        {
            Some(PaymentStatus::Paid)
        }
        _ => None,
    };

    if body.status == OrderStatus::Cancelled {
        let checkout = CheckoutService::new(state.client(), state.db(), state.razorpay().clone());
        checkout.cancel_order(id, &order.items).await?;
    } else {
        repo.update_status(id, body.status, payment_status).await?;
    }

    let updated = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;
    Ok(Json(OrderResponse::from(updated)))
}
