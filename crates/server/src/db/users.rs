//! User repository for database operations.

use bson::oid::ObjectId;
use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::Database;
use mongodb::Collection;

use marigold_core::{Address, Email, Role};

use super::{RepositoryError, collections};
use crate::models::User;

/// Repository for user database operations.
pub struct UserRepository {
    coll: Collection<User>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::USERS),
        }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(&self, user: &User) -> Result<ObjectId, RepositoryError> {
        let result = self
            .coll
            .insert_one(user)
            .await
            .map_err(|e| RepositoryError::from_write(e, "email already registered"))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::DataCorruption("inserted id is not an ObjectId".to_owned()))
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .coll
            .find_one(doc! { "email": email.as_str() })
            .await?)
    }

    /// Get a user by their id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<User>, RepositoryError> {
        Ok(self.coll.find_one(doc! { "_id": id }).await?)
    }

    /// List all users, newest first (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let cursor = self
            .coll
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Update the profile fields (name, and optionally the password hash).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: ObjectId,
        name: &str,
        password_hash: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut set = doc! {
            "name": name,
            "updated_at": bson::DateTime::now(),
        };
        if let Some(hash) = password_hash {
            set.insert("password_hash", hash);
        }

        self.update_one(doc! { "_id": id }, doc! { "$set": set })
            .await
    }

    /// Change a user's role (admin operation).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_role(&self, id: ObjectId, role: Role) -> Result<(), RepositoryError> {
        let role = bson::to_bson(&role)
            .map_err(|e| RepositoryError::DataCorruption(format!("role encode: {e}")))?;
        self.update_one(
            doc! { "_id": id },
            doc! { "$set": { "role": role, "updated_at": bson::DateTime::now() } },
        )
        .await
    }

    /// Add a product to the wishlist (idempotent via `$addToSet`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn wishlist_add(
        &self,
        id: ObjectId,
        product: ObjectId,
    ) -> Result<(), RepositoryError> {
        self.update_one(
            doc! { "_id": id },
            doc! { "$addToSet": { "wishlist": product } },
        )
        .await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn wishlist_remove(
        &self,
        id: ObjectId,
        product: ObjectId,
    ) -> Result<(), RepositoryError> {
        self.update_one(doc! { "_id": id }, doc! { "$pull": { "wishlist": product } })
            .await
    }

    /// Append a saved address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn address_add(
        &self,
        id: ObjectId,
        address: &Address,
    ) -> Result<(), RepositoryError> {
        let address = bson::to_bson(address)
            .map_err(|e| RepositoryError::DataCorruption(format!("address encode: {e}")))?;
        self.update_one(doc! { "_id": id }, doc! { "$push": { "addresses": address } })
            .await
    }

    /// Replace the saved address at `index`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or index doesn't exist.
    pub async fn address_update(
        &self,
        id: ObjectId,
        index: usize,
        address: &Address,
    ) -> Result<(), RepositoryError> {
        let address = bson::to_bson(address)
            .map_err(|e| RepositoryError::DataCorruption(format!("address encode: {e}")))?;
        let field = format!("addresses.{index}");

        // Guard on the element existing so out-of-range indexes 404 instead
        // of extending the array.
        self.update_one(
            doc! { "_id": id, &field: { "$exists": true } },
            doc! { "$set": { field: address } },
        )
        .await
    }

    /// Remove the saved address at `index`.
    ///
    /// MongoDB cannot `$pull` by position, so this unsets the slot and then
    /// pulls the null it leaves behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or index doesn't exist.
    pub async fn address_remove(&self, id: ObjectId, index: usize) -> Result<(), RepositoryError> {
        let field = format!("addresses.{index}");
        self.update_one(
            doc! { "_id": id, &field: { "$exists": true } },
            doc! { "$unset": { field: "" } },
        )
        .await?;
        self.update_one(
            doc! { "_id": id },
            doc! { "$pull": { "addresses": bson::Bson::Null } },
        )
        .await
    }

    /// Delete a user (admin operation).
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, RepositoryError> {
        let result = self.coll.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Count all users (dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the count fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.coll.count_documents(doc! {}).await?)
    }

    async fn update_one(&self, filter: Document, update: Document) -> Result<(), RepositoryError> {
        let result = self.coll.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
