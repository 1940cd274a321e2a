//! Store settings repository.
//!
//! The `settings` collection holds exactly one document, created lazily on
//! first read.

use bson::{Document, doc};
use mongodb::{Collection, Database};

use super::{RepositoryError, collections};
use crate::models::StoreSettings;

/// Repository for the settings singleton.
pub struct SettingsRepository {
    coll: Collection<StoreSettings>,
}

impl SettingsRepository {
    /// Create a new settings repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::SETTINGS),
        }
    }

    /// Fetch the singleton, inserting defaults on first read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the read or lazy insert fails.
    pub async fn get_or_create(&self) -> Result<StoreSettings, RepositoryError> {
        if let Some(settings) = self.coll.find_one(doc! {}).await? {
            return Ok(settings);
        }

        let mut settings = StoreSettings::default();
        let result = self.coll.insert_one(&settings).await?;
        settings.id = result.inserted_id.as_object_id();
        Ok(settings)
    }

    /// Apply `$set` updates to the singleton, creating it first if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(&self, set: Document) -> Result<StoreSettings, RepositoryError> {
        let current = self.get_or_create().await?;
        self.coll
            .update_one(doc! { "_id": current.id }, doc! { "$set": set })
            .await?;
        self.get_or_create().await
    }
}
