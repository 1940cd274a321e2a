//! Product repository for database operations.

use bson::oid::ObjectId;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{ClientSession, Collection, Database};

use super::{RepositoryError, collections};
use crate::models::Product;

/// Filters accepted by the product listing.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<ObjectId>,
    pub featured: Option<bool>,
    pub bestseller: Option<bool>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    /// When set, only active products are returned (storefront view).
    pub active_only: bool,
    pub skip: u64,
    pub limit: i64,
}

impl ProductFilter {
    /// Build the MongoDB filter document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(category) = self.category {
            filter.insert("category", category);
        }
        if let Some(featured) = self.featured {
            filter.insert("is_featured", featured);
        }
        if let Some(bestseller) = self.bestseller {
            filter.insert("is_bestseller", bestseller);
        }
        if let Some(search) = &self.search {
            filter.insert(
                "name",
                doc! { "$regex": regex_escape(search), "$options": "i" },
            );
        }
        if self.active_only {
            filter.insert("is_active", true);
        }
        filter
    }
}

/// Escape regex metacharacters so user search input is matched literally.
fn regex_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Repository for product database operations.
pub struct ProductRepository {
    coll: Collection<Product>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::PRODUCTS),
        }
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &Product) -> Result<ObjectId, RepositoryError> {
        let result = self.coll.insert_one(product).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::DataCorruption("inserted id is not an ObjectId".to_owned()))
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.coll.find_one(doc! { "_id": id }).await?)
    }

    /// List products matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let cursor = self
            .coll
            .find(filter.to_document())
            .sort(doc! { "created_at": -1 })
            .skip(filter.skip)
            .limit(filter.limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Count products matching the filter (for pagination).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the count fails.
    pub async fn count(&self, filter: &ProductFilter) -> Result<u64, RepositoryError> {
        Ok(self.coll.count_documents(filter.to_document()).await?)
    }

    /// Load all products referenced by `ids` in one query.
    ///
    /// Missing ids are simply absent from the result; the caller decides
    /// whether that is an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Product>, RepositoryError> {
        let cursor = self.coll.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Apply `$set` updates to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(&self, id: ObjectId, mut set: Document) -> Result<(), RepositoryError> {
        set.insert("updated_at", bson::DateTime::now());
        let result = self
            .coll
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self.coll.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Decrement stock for one product inside a transaction.
    ///
    /// The filter re-checks `stock >= quantity` so a concurrent order that
    /// consumed the remaining stock aborts this one instead of driving stock
    /// negative.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InsufficientStock` if the guard fails.
    pub async fn decrement_stock(
        &self,
        session: &mut ClientSession,
        id: ObjectId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        let result = self
            .coll
            .update_one(
                doc! { "_id": id, "stock": { "$gte": quantity } },
                doc! { "$inc": { "stock": -quantity } },
            )
            .session(&mut *session)
            .await?;

        if result.matched_count == 0 {
            return Err(RepositoryError::InsufficientStock {
                product: id.to_hex(),
            });
        }
        Ok(())
    }

    /// Return stock for one product inside the cancellation transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails. A missing
    /// product is ignored: it may have been deleted since the order was
    /// placed.
    pub async fn restock(
        &self,
        session: &mut ClientSession,
        id: ObjectId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        self.coll
            .update_one(doc! { "_id": id }, doc! { "$inc": { "stock": quantity } })
            .session(&mut *session)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_document_empty() {
        let filter = ProductFilter::default();
        assert_eq!(filter.to_document(), doc! {});
    }

    #[test]
    fn test_filter_document_storefront_view() {
        let category = ObjectId::new();
        let filter = ProductFilter {
            category: Some(category),
            featured: Some(true),
            active_only: true,
            ..Default::default()
        };
        let document = filter.to_document();
        assert_eq!(document.get_object_id("category").unwrap(), category);
        assert_eq!(document.get_bool("is_featured").unwrap(), true);
        assert_eq!(document.get_bool("is_active").unwrap(), true);
        assert!(document.get("is_bestseller").is_none());
    }

    #[test]
    fn test_search_is_escaped() {
        let filter = ProductFilter {
            search: Some("100% (cotton)".to_string()),
            ..Default::default()
        };
        let document = filter.to_document();
        let regex = document
            .get_document("name")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(regex, r"100% \(cotton\)");
    }
}
