//! Cart service.
//!
//! Every read reconciles the stored cart against the live catalog: lines
//! whose product was deleted or deactivated are pruned, quantities are
//! clamped to current stock, and unit prices are refreshed. The storefront
//! therefore never renders a stale price or an unorderable line.

use bson::oid::ObjectId;
use mongodb::Database;
use thiserror::Error;

use crate::db::{CartRepository, ProductRepository, RepositoryError, parse_object_id};
use crate::models::{Cart, CartItem, Product};

/// Errors that can occur during cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Referenced product doesn't exist or is inactive.
    #[error("product {product} is not available")]
    UnknownProduct { product: String },

    /// Requested quantity exceeds available stock.
    #[error("insufficient stock for {name}: {available} available")]
    InsufficientStock { name: String, available: i64 },

    /// Quantity must be positive.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Line to update/remove is not in the cart.
    #[error("item not found in cart")]
    ItemNotFound,

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Reconcile a cart against the live products backing its lines.
///
/// Pure: `products` must contain the catalog rows for the cart's lines
/// (missing rows mean the product was deleted). Returns `true` if the cart
/// changed and needs to be persisted.
pub fn reconcile(cart: &mut Cart, products: &[Product]) -> bool {
    let mut changed = false;

    cart.items.retain(|item| {
        let live = products
            .iter()
            .find(|p| p.id == Some(item.product))
            .filter(|p| p.is_active && p.stock > 0);
        if live.is_none() {
            changed = true;
        }
        live.is_some()
    });

    for item in &mut cart.items {
        // Retained lines always have a live product.
        let Some(live) = products.iter().find(|p| p.id == Some(item.product)) else {
            continue;
        };
        if item.quantity > live.stock {
            item.quantity = live.stock;
            changed = true;
        }
        if (item.price - live.price).abs() > f64::EPSILON {
            item.price = live.price;
            changed = true;
        }
    }

    if changed {
        cart.recompute_subtotal();
    }
    changed
}

/// Cart service.
pub struct CartService {
    carts: CartRepository,
    products: ProductRepository,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            carts: CartRepository::new(db),
            products: ProductRepository::new(db),
        }
    }

    /// Fetch the user's cart, reconciled against the live catalog.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on database failure.
    pub async fn get(&self, user: ObjectId) -> Result<Cart, CartError> {
        let mut cart = self.carts.get_or_empty(user).await?;
        if cart.items.is_empty() {
            return Ok(cart);
        }

        let ids: Vec<ObjectId> = cart.items.iter().map(|item| item.product).collect();
        let products = self.products.find_by_ids(&ids).await?;
        if reconcile(&mut cart, &products) {
            self.carts.save(&mut cart).await?;
        }
        Ok(cart)
    }

    /// Add `quantity` of a product (with optional size) to the cart,
    /// merging into an existing line when present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownProduct` for missing/inactive products and
    /// `CartError::InsufficientStock` when the merged quantity exceeds stock.
    pub async fn add_item(
        &self,
        user: ObjectId,
        product_id: &str,
        size: Option<String>,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let id = parse_object_id(product_id).map_err(|_| CartError::UnknownProduct {
            product: product_id.to_owned(),
        })?;
        let product = self
            .products
            .get_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| CartError::UnknownProduct {
                product: product_id.to_owned(),
            })?;

        let mut cart = self.get(user).await?;

        let merged = match cart.position_of(&id, size.as_deref()) {
            Some(pos) => cart.items[pos].quantity + quantity,
            None => quantity,
        };
        if !product.has_stock(merged) {
            return Err(CartError::InsufficientStock {
                name: product.name,
                available: product.stock,
            });
        }

        match cart.position_of(&id, size.as_deref()) {
            Some(pos) => {
                cart.items[pos].quantity = merged;
                cart.items[pos].price = product.price;
            }
            None => cart.items.push(CartItem {
                product: id,
                size,
                quantity,
                price: product.price,
            }),
        }

        cart.recompute_subtotal();
        self.carts.save(&mut cart).await?;
        Ok(cart)
    }

    /// Set the quantity of an existing line. A quantity of zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line isn't in the cart.
    pub async fn update_quantity(
        &self,
        user: ObjectId,
        product_id: &str,
        size: Option<&str>,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity == 0 {
            return self.remove_item(user, product_id, size).await;
        }

        let id = parse_object_id(product_id).map_err(|_| CartError::ItemNotFound)?;
        let mut cart = self.get(user).await?;
        let pos = cart
            .position_of(&id, size)
            .ok_or(CartError::ItemNotFound)?;

        let product = self
            .products
            .get_by_id(id)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        if !product.has_stock(quantity) {
            return Err(CartError::InsufficientStock {
                name: product.name,
                available: product.stock,
            });
        }

        cart.items[pos].quantity = quantity;
        cart.items[pos].price = product.price;
        cart.recompute_subtotal();
        self.carts.save(&mut cart).await?;
        Ok(cart)
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line isn't in the cart.
    pub async fn remove_item(
        &self,
        user: ObjectId,
        product_id: &str,
        size: Option<&str>,
    ) -> Result<Cart, CartError> {
        let id = parse_object_id(product_id).map_err(|_| CartError::ItemNotFound)?;
        let mut cart = self.get(user).await?;
        let pos = cart
            .position_of(&id, size)
            .ok_or(CartError::ItemNotFound)?;

        cart.items.remove(pos);
        cart.recompute_subtotal();
        self.carts.save(&mut cart).await?;
        Ok(cart)
    }

    /// Empty the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on database failure.
    pub async fn clear(&self, user: ObjectId) -> Result<Cart, CartError> {
        self.carts.clear(user).await?;
        Ok(Cart::empty(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(price: f64, stock: i64, active: bool) -> Product {
        Product {
            id: Some(ObjectId::new()),
            name: "Test Product".to_string(),
            description: String::new(),
            price,
            mrp: price,
            category: ObjectId::new(),
            brand: String::new(),
            stock,
            images: vec![],
            sizes: vec![],
            is_featured: false,
            is_bestseller: false,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart_with(items: Vec<CartItem>) -> Cart {
        let mut cart = Cart::empty(ObjectId::new());
        cart.items = items;
        cart.recompute_subtotal();
        cart
    }

    #[test]
    fn test_reconcile_unchanged_cart() {
        let p = product(500.0, 10, true);
        let mut cart = cart_with(vec![CartItem {
            product: p.id.unwrap(),
            size: None,
            quantity: 2,
            price: 500.0,
        }]);

        assert!(!reconcile(&mut cart, std::slice::from_ref(&p)));
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_reconcile_drops_deleted_product() {
        let mut cart = cart_with(vec![CartItem {
            product: ObjectId::new(),
            size: None,
            quantity: 1,
            price: 500.0,
        }]);

        assert!(reconcile(&mut cart, &[]));
        assert!(cart.items.is_empty());
        assert!(cart.subtotal.abs() < f64::EPSILON);
    }

    #[test]
    fn test_reconcile_drops_inactive_and_out_of_stock() {
        let inactive = product(500.0, 10, false);
        let sold_out = product(300.0, 0, true);
        let mut cart = cart_with(vec![
            CartItem {
                product: inactive.id.unwrap(),
                size: None,
                quantity: 1,
                price: 500.0,
            },
            CartItem {
                product: sold_out.id.unwrap(),
                size: None,
                quantity: 1,
                price: 300.0,
            },
        ]);

        assert!(reconcile(&mut cart, &[inactive, sold_out]));
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_reconcile_clamps_quantity_to_stock() {
        let p = product(500.0, 3, true);
        let mut cart = cart_with(vec![CartItem {
            product: p.id.unwrap(),
            size: None,
            quantity: 5,
            price: 500.0,
        }]);

        assert!(reconcile(&mut cart, std::slice::from_ref(&p)));
        assert_eq!(cart.items[0].quantity, 3);
        assert!((cart.subtotal - 1500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reconcile_refreshes_price() {
        let p = product(450.0, 10, true);
        let mut cart = cart_with(vec![CartItem {
            product: p.id.unwrap(),
            size: Some("M".to_string()),
            quantity: 2,
            price: 500.0,
        }]);

        assert!(reconcile(&mut cart, std::slice::from_ref(&p)));
        assert!((cart.items[0].price - 450.0).abs() < f64::EPSILON);
        assert!((cart.subtotal - 900.0).abs() < f64::EPSILON);
    }
}
