//! Admin user management commands.
//!
//! There is no HTTP endpoint for creating the first admin; bootstrap happens
//! here, against the same collections the server uses.
//!
//! # Usage
//!
//! ```bash
//! marigold admin create -e admin@example.com -n "Admin Name" -p "a strong password"
//! ```

use chrono::Utc;

use marigold_core::{Email, Role};
use marigold_server::db::{RepositoryError, UserRepository};
use marigold_server::models::User;
use marigold_server::services::auth::{hash_password, validate_password};

use super::CliError;

/// Create a new admin user.
///
/// # Errors
///
/// Returns `CliError::UserExists` if the email is already registered, and
/// validation errors for a malformed email or weak password.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;
    validate_password(password).map_err(|e| CliError::InvalidPassword(e.to_string()))?;
    let password_hash =
        hash_password(password).map_err(|e| CliError::InvalidPassword(e.to_string()))?;

    let (_client, db) = super::connect_from_env().await?;

    tracing::info!(email = %email, "Creating admin user...");

    let now = Utc::now();
    let user = User {
        id: None,
        name: name.trim().to_owned(),
        email: email.clone(),
        password_hash,
        role: Role::Admin,
        wishlist: Vec::new(),
        addresses: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let id = UserRepository::new(&db)
        .create(&user)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::UserExists(email.to_string()),
            other => CliError::Repository(other),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        id.to_hex(),
        email
    );
    Ok(())
}
