//! Category repository for database operations.

use bson::oid::ObjectId;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use super::{RepositoryError, collections};
use crate::models::Category;

/// Repository for category database operations.
pub struct CategoryRepository {
    coll: Collection<Category>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::CATEGORIES),
        }
    }

    /// Insert a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    pub async fn create(&self, category: &Category) -> Result<ObjectId, RepositoryError> {
        let result = self
            .coll
            .insert_one(category)
            .await
            .map_err(|e| RepositoryError::from_write(e, "category name already exists"))?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::DataCorruption("inserted id is not an ObjectId".to_owned()))
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.coll.find_one(doc! { "_id": id }).await?)
    }

    /// List categories, alphabetically. `active_only` is the storefront view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Category>, RepositoryError> {
        let filter = if active_only {
            doc! { "is_active": true }
        } else {
            doc! {}
        };
        let cursor = self.coll.find(filter).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Apply `$set` updates to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist and
    /// `RepositoryError::Conflict` on a duplicate name.
    pub async fn update(&self, id: ObjectId, set: Document) -> Result<(), RepositoryError> {
        let result = self
            .coll
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await
            .map_err(|e| RepositoryError::from_write(e, "category name already exists"))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a category.
    ///
    /// Products referencing it are left untouched (documented gap).
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self.coll.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
