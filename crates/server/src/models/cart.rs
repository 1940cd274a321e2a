//! Cart document: one per user.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A line in a user's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub quantity: i64,
    /// Unit price snapshot, refreshed from the product on every read.
    pub price: f64,
}

/// A cart document in the `carts` collection.
///
/// `user` carries a unique index: at most one cart per user, created lazily
/// on first read. All mutations are array edits on this document followed by
/// a subtotal recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// An empty cart for a user.
    #[must_use]
    pub fn empty(user: ObjectId) -> Self {
        Self {
            id: None,
            user,
            items: Vec::new(),
            subtotal: 0.0,
            updated_at: Utc::now(),
        }
    }

    /// Recompute `subtotal` from the current line items.
    #[allow(clippy::cast_precision_loss)] // Quantities are small
    pub fn recompute_subtotal(&mut self) {
        self.subtotal = self
            .items
            .iter()
            .map(|item| item.price * item.quantity as f64)
            .sum();
    }

    /// Find the position of a line by product (and size, when given).
    #[must_use]
    pub fn position_of(&self, product: &ObjectId, size: Option<&str>) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product == *product && item.size.as_deref() == size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_recompute_subtotal() {
        let mut cart = Cart::empty(ObjectId::new());
        cart.items.push(CartItem {
            product: ObjectId::new(),
            size: None,
            quantity: 2,
            price: 250.0,
        });
        cart.items.push(CartItem {
            product: ObjectId::new(),
            size: Some("L".to_string()),
            quantity: 1,
            price: 999.5,
        });

        cart.recompute_subtotal();
        assert!((cart.subtotal - 1499.5).abs() < f64::EPSILON);

        cart.items.clear();
        cart.recompute_subtotal();
        assert!(cart.subtotal.abs() < f64::EPSILON);
    }

    #[test]
    fn test_position_of_matches_product_and_size() {
        let product = ObjectId::new();
        let mut cart = Cart::empty(ObjectId::new());
        cart.items.push(CartItem {
            product,
            size: Some("M".to_string()),
            quantity: 1,
            price: 100.0,
        });

        assert_eq!(cart.position_of(&product, Some("M")), Some(0));
        assert_eq!(cart.position_of(&product, Some("L")), None);
        assert_eq!(cart.position_of(&product, None), None);
        assert_eq!(cart.position_of(&ObjectId::new(), Some("M")), None);
    }
}
