//! Payment repository for database operations.

use bson::oid::ObjectId;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{ClientSession, Collection, Database};

use super::{RepositoryError, collections};
use crate::models::Payment;

/// Repository for payment database operations.
pub struct PaymentRepository {
    coll: Collection<Payment>,
}

impl PaymentRepository {
    /// Create a new payment repository.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            coll: db.collection(collections::PAYMENTS),
        }
    }

    /// Insert a payment inside an open transaction.
    ///
    /// Payments are only written together with their order, so there is no
    /// sessionless insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_in_session(
        &self,
        session: &mut ClientSession,
        payment: &Payment,
    ) -> Result<ObjectId, RepositoryError> {
        let result = self.coll.insert_one(payment).session(session).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::DataCorruption("inserted id is not an ObjectId".to_owned()))
    }

    /// List all payments, newest first (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Payment>, RepositoryError> {
        let cursor = self
            .coll
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Total revenue: the sum of all `Success` payments' amounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn revenue_total(&self) -> Result<f64, RepositoryError> {
        let pipeline = vec![
            doc! { "$match": { "status": "Success" } },
            doc! { "$group": { "_id": bson::Bson::Null, "total": { "$sum": "$amount" } } },
        ];

        let cursor = self.coll.aggregate(pipeline).await?;
        let rows: Vec<bson::Document> = cursor.try_collect().await?;

        // No successful payments yet: the group stage emits nothing.
        match rows.first() {
            Some(row) => row.get_f64("total").map_err(|e| {
                RepositoryError::DataCorruption(format!("revenue aggregate: {e}"))
            }),
            None => Ok(0.0),
        }
    }
}
