//! Hero slide repository for database operations.

use bson::oid::ObjectId;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use super::{RepositoryError, collections};
use crate::models::HeroSlide;

/// Repository for hero banner slides.
pub struct HeroRepository {
    coll: Collection<HeroSlide>,
}

impl HeroRepository {
    /// Create a new hero slide repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::HERO_SLIDES),
        }
    }

    /// Insert a new slide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, slide: &HeroSlide) -> Result<ObjectId, RepositoryError> {
        let result = self.coll.insert_one(slide).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::DataCorruption("inserted id is not an ObjectId".to_owned()))
    }

    /// Active slides for the storefront carousel, lowest `order` first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<HeroSlide>, RepositoryError> {
        let cursor = self
            .coll
            .find(doc! { "is_active": true })
            .sort(doc! { "order": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// All slides regardless of active flag (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<HeroSlide>, RepositoryError> {
        let cursor = self.coll.find(doc! {}).sort(doc! { "order": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Apply `$set` updates to a slide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slide doesn't exist.
    pub async fn update(&self, id: ObjectId, set: Document) -> Result<(), RepositoryError> {
        let result = self
            .coll
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a slide.
    ///
    /// # Returns
    ///
    /// Returns `true` if the slide was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self.coll.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
