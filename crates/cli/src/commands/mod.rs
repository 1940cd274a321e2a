//! CLI command implementations.

pub mod admin;
pub mod indexes;
pub mod seed;

use mongodb::{Client, Database};
use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Repository error from the server's data layer.
    #[error("Repository error: {0}")]
    Repository(#[from] marigold_server::db::RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password failed validation.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

/// Connect using the same `MONGODB_*` variables as the server.
pub async fn connect_from_env() -> Result<(Client, Database), CliError> {
    dotenvy::dotenv().ok();

    let uri = std::env::var("MONGODB_URI")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("MONGODB_URI"))?;
    let database =
        std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "marigold".to_string());

    tracing::info!(database = %database, "Connecting to MongoDB...");
    Ok(marigold_server::db::connect(&uri, &database).await?)
}
