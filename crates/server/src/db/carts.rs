//! Cart repository: one document per user, whole-document writes.
//!
//! Cart mutations are array edits followed by a subtotal recompute, so the
//! repository replaces the full document rather than issuing positional
//! updates. Concurrent edits to the same cart are last-write-wins, like the
//! rest of the catalog.

use bson::oid::ObjectId;
use bson::doc;
use chrono::Utc;
use mongodb::{Collection, Database};

use super::{RepositoryError, collections};
use crate::models::Cart;

/// Repository for cart database operations.
pub struct CartRepository {
    coll: Collection<Cart>,
}

impl CartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::CARTS),
        }
    }

    /// Fetch a user's cart, or an unsaved empty one if none exists yet.
    ///
    /// The empty cart is not persisted; the first mutation (or a pruning
    /// read) saves it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_empty(&self, user: ObjectId) -> Result<Cart, RepositoryError> {
        let existing = self.coll.find_one(doc! { "user": user }).await?;
        Ok(existing.unwrap_or_else(|| Cart::empty(user)))
    }

    /// Persist a cart, replacing the existing document (upsert on user).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn save(&self, cart: &mut Cart) -> Result<(), RepositoryError> {
        cart.updated_at = Utc::now();
        self.coll
            .replace_one(doc! { "user": cart.user }, &*cart)
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Delete a user's cart (clear operation and post-checkout cleanup).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user: ObjectId) -> Result<(), RepositoryError> {
        self.coll.delete_one(doc! { "user": user }).await?;
        Ok(())
    }
}
