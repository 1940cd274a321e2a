//! Product document.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of images every product carries.
///
/// Create requires exactly this many uploads; update replaces the whole set
/// or keeps the existing one.
pub const PRODUCT_IMAGE_COUNT: usize = 4;

/// A product document in the `products` collection.
///
/// `category` references a category that existed and was active when the
/// product was written; the reference is not re-validated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Selling price.
    pub price: f64,
    /// Maximum retail price (strike-through price in the storefront).
    pub mrp: f64,
    pub category: ObjectId,
    #[serde(default)]
    pub brand: String,
    pub stock: i64,
    /// CDN URLs, exactly [`PRODUCT_IMAGE_COUNT`] at create time.
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Whether the requested quantity can currently be fulfilled.
    #[must_use]
    pub const fn has_stock(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock >= quantity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_has_stock() {
        let product = Product {
            id: Some(ObjectId::new()),
            name: "Linen Kurta".to_string(),
            description: String::new(),
            price: 1499.0,
            mrp: 1999.0,
            category: ObjectId::new(),
            brand: "Marigold".to_string(),
            stock: 3,
            images: vec![],
            sizes: vec!["M".to_string(), "L".to_string()],
            is_featured: false,
            is_bestseller: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.has_stock(1));
        assert!(product.has_stock(3));
        assert!(!product.has_stock(4));
        assert!(!product.has_stock(0));
        assert!(!product.has_stock(-1));
    }

    #[test]
    fn test_is_active_defaults_true() {
        // Documents written before the flag existed deserialize as active.
        let doc = bson::doc! {
            "name": "Old Product",
            "price": 100.0,
            "mrp": 120.0,
            "category": ObjectId::new(),
            "stock": 1_i64,
            "images": [],
            "created_at": bson::DateTime::now(),
            "updated_at": bson::DateTime::now(),
        };
        let product: Product = bson::from_document(doc).unwrap();
        assert!(product.is_active);
    }
}
