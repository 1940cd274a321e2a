//! Payment routes.

use axum::{Json, extract::State};
use serde::Deserialize;

use marigold_core::Address;

use crate::db::PaymentRepository;
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::dto::{OrderResponse, PaymentResponse};
use crate::services::checkout::{CheckoutService, OrderLine};
use crate::state::AppState;

use super::owner_id;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// The lines the client paid for; re-validated server-side.
    pub items: Vec<OrderLine>,
    pub shipping_address: Address,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

/// POST /api/payments/verify
///
/// Verifies the checkout signature and, only on success, creates the order,
/// decrements stock, and records the payment in one transaction. A tampered
/// signature returns 400 and writes nothing.
pub async fn verify(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<OrderResponse>> {
    let checkout = CheckoutService::new(state.client(), state.db(), state.razorpay().clone());
    let order = checkout
        .verify_and_place_order(
            owner_id(&user)?,
            &body.items,
            body.shipping_address,
            &body.gateway_order_id,
            &body.gateway_payment_id,
            &body.signature,
        )
        .await?;
    Ok(Json(OrderResponse::from(order)))
}

/// GET /api/payments (admin)
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<PaymentResponse>>> {
    let payments = PaymentRepository::new(state.db()).list().await?;
    Ok(Json(
        payments.into_iter().map(PaymentResponse::from).collect(),
    ))
}
