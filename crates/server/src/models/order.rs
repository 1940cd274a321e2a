//! Order document and denormalized line items.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marigold_core::{Address, OrderStatus, PaymentMethod, PaymentStatus};

/// A single line in an order.
///
/// Product name, image, and unit price are denormalized at placement time so
/// later product edits never rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub quantity: i64,
    /// Unit price at placement time.
    pub price: f64,
}

impl OrderItem {
    /// Line total for this item.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Quantities are small
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// An order document in the `orders` collection.
///
/// Items reference products that existed and had sufficient stock at
/// creation time; that invariant is enforced by the checkout transaction,
/// not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    /// Gateway order id (`ONLINE` orders only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    /// Gateway payment id, set once the payment is verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_payment_id: Option<String>,
    pub total_price: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub order_status: OrderStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of all line totals.
    #[must_use]
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}
