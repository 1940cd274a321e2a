//! Integration tests for Marigold Commerce.
//!
//! # Running Tests
//!
//! ```bash
//! # Start MongoDB and the API server
//! cargo run -p marigold-server
//!
//! # Run integration tests (all are #[ignore]d by default)
//! cargo test -p marigold-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - API server base URL (default: `http://localhost:4000`)
//! - `MONGODB_URI` - MongoDB connection string for direct state assertions
//! - `MONGODB_DATABASE` - Database name (default: `marigold`)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - Credentials for admin-only tests
//!   (create with `marigold admin create`)

use mongodb::{Client as MongoClient, Database};
use reqwest::Client;
use serde_json::{Value, json};

/// Shared context for API tests: an HTTP client plus the server base URL.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build a context from environment variables.
    #[must_use]
    pub fn new() -> Self {
        let base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");
        Self { client, base_url }
    }

    /// URL for an API path, e.g. `ctx.api("/products")`.
    #[must_use]
    pub fn api(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// Connect to the same database the server under test uses.
    ///
    /// # Panics
    ///
    /// Panics if `MONGODB_URI` is missing or unreachable.
    pub async fn db() -> Database {
        let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
        let database =
            std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "marigold".to_string());
        let client = MongoClient::with_uri_str(&uri)
            .await
            .expect("Failed to connect to MongoDB");
        client.database(&database)
    }

    /// Register a fresh user and return its bearer token.
    ///
    /// Each call uses a unique email so tests don't collide.
    pub async fn register_user(&self) -> String {
        let email = format!("it-{}@example.com", bson::oid::ObjectId::new().to_hex());
        let resp = self
            .client
            .post(self.api("/auth/register"))
            .json(&json!({
                "name": "Integration Test",
                "email": email,
                "password": "correct horse battery staple",
            }))
            .send()
            .await
            .expect("Failed to register user");
        assert!(
            resp.status().is_success(),
            "register failed: {}",
            resp.status()
        );
        let body: Value = resp.json().await.expect("Failed to parse register response");
        body.get("token")
            .and_then(Value::as_str)
            .expect("register response missing token")
            .to_string()
    }

    /// Log in with the `ADMIN_EMAIL`/`ADMIN_PASSWORD` credentials.
    ///
    /// # Panics
    ///
    /// Panics if the variables are unset or login fails.
    pub async fn admin_token(&self) -> String {
        let email = std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL must be set");
        let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");
        let resp = self
            .client
            .post(self.api("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to log in as admin");
        assert!(
            resp.status().is_success(),
            "admin login failed: {}",
            resp.status()
        );
        let body: Value = resp.json().await.expect("Failed to parse login response");
        body.get("token")
            .and_then(Value::as_str)
            .expect("login response missing token")
            .to_string()
    }
}
