//! Admin dashboard route.
//!
//! Reporting only: every number is computed on demand from the collections;
//! nothing here is stored or cached.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::{OrderRepository, PaymentRepository, ProductRepository, UserRepository};
use crate::db::products::ProductFilter;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::dto::{OrderResponse, TopProductResponse};
use crate::state::AppState;

const TOP_PRODUCT_LIMIT: i64 = 5;
const RECENT_ORDER_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user_count: u64,
    pub product_count: u64,
    pub order_count: u64,
    /// Sum of all `Success` payments' amounts.
    pub revenue: f64,
    pub top_products: Vec<TopProductResponse>,
    pub recent_orders: Vec<OrderResponse>,
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<DashboardResponse>> {
    let db = state.db();
    let orders = OrderRepository::new(db);

    let user_count = UserRepository::new(db).count().await?;
    let product_count = ProductRepository::new(db)
        .count(&ProductFilter::default())
        .await?;
    let order_count = orders.count().await?;
    let revenue = PaymentRepository::new(db).revenue_total().await?;
    let top_products = orders.top_products(TOP_PRODUCT_LIMIT).await?;
    let recent_orders = orders.recent(RECENT_ORDER_LIMIT).await?;

    Ok(Json(DashboardResponse {
        user_count,
        product_count,
        order_count,
        revenue,
        top_products: top_products
            .into_iter()
            .map(TopProductResponse::from)
            .collect(),
        recent_orders: recent_orders.into_iter().map(OrderResponse::from).collect(),
    }))
}
