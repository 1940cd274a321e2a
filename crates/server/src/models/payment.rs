//! Payment document.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settlement status recorded for a verified gateway payment.
///
/// Distinct from the per-order `PaymentStatus`: this is the gateway-side
/// record, and the dashboard revenue aggregate sums only `Success` rows.
/// The verify flow never constructs `Failed` (a failed verification writes
/// nothing); the variant exists so documents marked failed out of band,
/// during manual reconciliation, still deserialize and stay out of revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GatewayPaymentStatus {
    #[default]
    Success,
    Failed,
}

/// A payment document in the `payments` collection.
///
/// Created only after the gateway signature verifies; a tampered signature
/// leaves no payment (or order) document behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub order: ObjectId,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
    pub amount: f64,
    #[serde(default)]
    pub status: GatewayPaymentStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}
