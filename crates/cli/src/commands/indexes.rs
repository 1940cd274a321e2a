//! Index sync command.
//!
//! The server also syncs indexes on startup; this command exists for
//! provisioning a database before the first deploy.

use super::CliError;

/// Create/sync the MongoDB indexes the server relies on.
pub async fn sync() -> Result<(), CliError> {
    let (_client, db) = super::connect_from_env().await?;

    marigold_server::db::ensure_indexes(&db).await?;
    tracing::info!("Indexes synced");
    Ok(())
}
