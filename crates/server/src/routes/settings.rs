//! Store settings routes.

use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::db::SettingsRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::dto::StoreSettingsResponse;
use crate::state::AppState;

/// CDN folder for the store logo.
const IMAGE_FOLDER: &str = "settings";

/// GET /api/settings
///
/// The singleton is created with defaults on first read.
pub async fn show(State(state): State<AppState>) -> Result<Json<StoreSettingsResponse>> {
    let settings = SettingsRepository::new(state.db()).get_or_create().await?;
    Ok(Json(settings.into()))
}

/// PUT /api/settings (admin, multipart, logo optional)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<StoreSettingsResponse>> {
    let mut set = bson::doc! {};

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "logo" {
            let file_name = field.file_name().unwrap_or("logo").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("logo read failed: {e}")))?;
            let url = state
                .media()
                .upload_image(bytes.to_vec(), &file_name, IMAGE_FOLDER)
                .await?;
            set.insert("logo", url);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("field read failed: {e}")))?;
        match name.as_str() {
            "store_name" => {
                if value.trim().is_empty() {
                    return Err(AppError::BadRequest(
                        "store_name must not be empty".to_string(),
                    ));
                }
                set.insert("store_name", value);
            }
            "support_email" => {
                set.insert("support_email", value);
            }
            "support_phone" => {
                set.insert("support_phone", value);
            }
            "address" => {
                set.insert("address", value);
            }
            _ => {}
        }
    }

    if set.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let settings = SettingsRepository::new(state.db()).update(set).await?;
    Ok(Json(settings.into()))
}
