//! Database operations for the MongoDB document store.
//!
//! # Collections
//!
//! - `users` - Accounts, wishlists, saved addresses (unique index on email)
//! - `products` - Catalog items referencing a category
//! - `categories` - Catalog taxonomy (unique index on name)
//! - `orders` - Placed orders with denormalized line items
//! - `payments` - Verified gateway payments
//! - `hero_slides` - Storefront banner carousel
//! - `settings` - Singleton store settings, created lazily
//! - `carts` - One cart per user (unique index on user)
//!
//! Indexes are created via `ensure_indexes` at server startup or
//! `cargo run -p marigold-cli -- indexes`.

pub mod carts;
pub mod categories;
pub mod hero;
pub mod orders;
pub mod payments;
pub mod products;
pub mod settings;
pub mod users;

use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use secrecy::ExposeSecret;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use hero::HeroRepository;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use products::ProductRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;

/// Collection names, shared with the CLI.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const ORDERS: &str = "orders";
    pub const PAYMENTS: &str = "payments";
    pub const HERO_SLIDES: &str = "hero_slides";
    pub const SETTINGS: &str = "settings";
    pub const CARTS: &str = "carts";
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Driver error from MongoDB.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A referenced product no longer has enough stock.
    #[error("insufficient stock for product {product}")]
    InsufficientStock {
        /// Hex id of the product that could not be decremented.
        product: String,
    },
}

impl RepositoryError {
    /// Map a driver error into `Conflict` when it is a duplicate-key write,
    /// passing everything else through as `Database`.
    #[must_use]
    pub fn from_write(err: mongodb::error::Error, conflict_message: &str) -> Self {
        use mongodb::error::{ErrorKind, WriteError, WriteFailure};

        const DUPLICATE_KEY: i32 = 11000;

        if let ErrorKind::Write(WriteFailure::WriteError(WriteError { code, .. })) = *err.kind
            && code == DUPLICATE_KEY
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(err)
    }
}

/// Connect to MongoDB and select the application database.
///
/// The connection string may carry credentials, so it is wrapped in a
/// `SecretString` until handed to the driver.
///
/// # Errors
///
/// Returns the driver error if the URI is malformed or the initial
/// handshake fails.
pub async fn connect(
    uri: &secrecy::SecretString,
    database: &str,
) -> Result<(Client, Database), mongodb::error::Error> {
    let client = Client::with_uri_str(uri.expose_secret()).await?;
    let db = client.database(database);
    Ok((client, db))
}

/// Create the indexes the application relies on.
///
/// Idempotent: MongoDB treats an identical existing index as a no-op.
///
/// # Errors
///
/// Returns the driver error if index creation fails.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let unique = IndexOptions::builder().unique(true).build();

    db.collection::<bson::Document>(collections::USERS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    db.collection::<bson::Document>(collections::CATEGORIES)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    db.collection::<bson::Document>(collections::CARTS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "user": 1 })
                .options(unique)
                .build(),
        )
        .await?;

    // Query-shape indexes (non-unique)
    db.collection::<bson::Document>(collections::ORDERS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "user": 1, "created_at": -1 })
                .build(),
        )
        .await?;

    db.collection::<bson::Document>(collections::PRODUCTS)
        .create_index(IndexModel::builder().keys(doc! { "category": 1 }).build())
        .await?;

    Ok(())
}

/// Parse a hex string into an `ObjectId`, mapping failure to `NotFound`.
///
/// A malformed id can never match a document, so callers treat it the same
/// as a missing one.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the string is not a valid id.
pub fn parse_object_id(hex: &str) -> Result<bson::oid::ObjectId, RepositoryError> {
    bson::oid::ObjectId::parse_str(hex).map_err(|_| RepositoryError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id_valid() {
        let id = bson::oid::ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).ok(), Some(id));
    }

    #[test]
    fn test_parse_object_id_invalid_is_not_found() {
        assert!(matches!(
            parse_object_id("not-a-hex-id"),
            Err(RepositoryError::NotFound)
        ));
    }
}
