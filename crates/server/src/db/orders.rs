//! Order repository for database operations.

use bson::oid::ObjectId;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{ClientSession, Collection, Database};
use serde::Deserialize;

use marigold_core::{OrderStatus, PaymentStatus};

use super::{RepositoryError, collections};
use crate::models::Order;

/// A row in the dashboard "top products" report.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct TopProduct {
    /// Product id (hexified by the route layer).
    #[serde(rename = "_id")]
    pub product: ObjectId,
    pub name: String,
    pub total_quantity: i64,
}

/// Build the `$set` document for a status update.
fn status_update_doc(
    order_status: OrderStatus,
    payment_status: Option<PaymentStatus>,
) -> Result<bson::Document, RepositoryError> {
    let order_status = bson::to_bson(&order_status)
        .map_err(|e| RepositoryError::DataCorruption(format!("status encode: {e}")))?;
    let mut set = doc! {
        "order_status": order_status,
        "updated_at": bson::DateTime::now(),
    };
    if let Some(payment_status) = payment_status {
        let payment_status = bson::to_bson(&payment_status)
            .map_err(|e| RepositoryError::DataCorruption(format!("status encode: {e}")))?;
        set.insert("payment_status", payment_status);
    }
    Ok(set)
}

/// Repository for order database operations.
pub struct OrderRepository {
    coll: Collection<Order>,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::ORDERS),
        }
    }

    /// Insert an order inside an open transaction.
    ///
    /// Paired with `ProductRepository::decrement_stock` by the checkout
    /// service; never call outside a session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_in_session(
        &self,
        session: &mut ClientSession,
        order: &Order,
    ) -> Result<ObjectId, RepositoryError> {
        let result = self.coll.insert_one(order).session(session).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::DataCorruption("inserted id is not an ObjectId".to_owned()))
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.coll.find_one(doc! { "_id": id }).await?)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user: ObjectId) -> Result<Vec<Order>, RepositoryError> {
        let cursor = self
            .coll
            .find(doc! { "user": user })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// List all orders (admin), optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut filter = doc! {};
        if let Some(status) = status {
            let status = bson::to_bson(&status)
                .map_err(|e| RepositoryError::DataCorruption(format!("status encode: {e}")))?;
            filter.insert("order_status", status);
        }
        let cursor = self
            .coll
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// The most recent orders (dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        self.list_all(None, 0, limit).await
    }

    /// Update an order's status, and the payment status when provided
    /// (COD orders become paid on delivery).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: ObjectId,
        order_status: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<(), RepositoryError> {
        let set = status_update_doc(order_status, payment_status)?;
        let result = self
            .coll
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update an order's status inside an open transaction.
    ///
    /// Cancellation pairs this with `ProductRepository::restock` so the
    /// status write and the stock returns commit together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status_in_session(
        &self,
        session: &mut ClientSession,
        id: ObjectId,
        order_status: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<(), RepositoryError> {
        let set = status_update_doc(order_status, payment_status)?;
        let result = self
            .coll
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count all orders (dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the count fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.coll.count_documents(doc! {}).await?)
    }

    /// Top `limit` products by total quantity sold, across all orders.
    ///
    /// Unwinds line items and groups by product; reporting only, nothing is
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn top_products(&self, limit: i64) -> Result<Vec<TopProduct>, RepositoryError> {
        let pipeline = vec![
            doc! { "$unwind": "$items" },
            doc! { "$group": {
                "_id": "$items.product",
                "name": { "$last": "$items.name" },
                "total_quantity": { "$sum": "$items.quantity" },
            }},
            doc! { "$sort": { "total_quantity": -1 } },
            doc! { "$limit": limit },
        ];

        let cursor = self.coll.aggregate(pipeline).await?;
        let rows: Vec<bson::Document> = cursor.try_collect().await?;
        rows.into_iter()
            .map(|row| {
                bson::from_document(row)
                    .map_err(|e| RepositoryError::DataCorruption(format!("top products row: {e}")))
            })
            .collect()
    }
}
