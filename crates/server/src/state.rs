//! Application state shared across handlers.

use std::sync::Arc;

use mongodb::{Client, Database};

use crate::config::ServerConfig;
use crate::services::auth::TokenKeys;
use crate::services::media::{MediaClient, MediaError};
use crate::services::razorpay::{RazorpayClient, RazorpayError};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("gateway client error: {0}")]
    Gateway(#[from] RazorpayError),
    #[error("media client error: {0}")]
    Media(#[from] MediaError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database handle and third-party clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    client: Client,
    db: Database,
    razorpay: RazorpayClient,
    media: MediaClient,
    token_keys: TokenKeys,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `client` - MongoDB client (sessions for transactions come from here)
    /// * `db` - Handle to the application database
    ///
    /// # Errors
    ///
    /// Returns an error if a third-party HTTP client fails to build.
    pub fn new(config: &ServerConfig, client: Client, db: Database) -> Result<Self, StateError> {
        let razorpay = RazorpayClient::new(&config.razorpay)?;
        let media = MediaClient::new(&config.cloudinary)?;
        let token_keys = TokenKeys::new(&config.jwt_secret, config.jwt_ttl_hours);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                client,
                db,
                razorpay,
                media,
                token_keys,
            }),
        })
    }

    /// Get a reference to the MongoDB client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Get a reference to the application database.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn razorpay(&self) -> &RazorpayClient {
        &self.inner.razorpay
    }

    /// Get a reference to the image CDN client.
    #[must_use]
    pub fn media(&self) -> &MediaClient {
        &self.inner.media
    }

    /// Get a reference to the token signing keys.
    #[must_use]
    pub fn token_keys(&self) -> &TokenKeys {
        &self.inner.token_keys
    }
}
