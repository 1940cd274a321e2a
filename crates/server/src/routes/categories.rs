//! Category routes.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::db::{CategoryRepository, parse_object_id};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::Category;
use crate::models::dto::CategoryResponse;
use crate::state::AppState;

/// CDN folder for category images.
const IMAGE_FOLDER: &str = "categories";

/// Text fields accepted by the multipart create/update forms.
#[derive(Debug, Default)]
struct CategoryForm {
    name: Option<String>,
    description: Option<String>,
    is_active: Option<bool>,
    image: Option<(String, Vec<u8>)>,
}

impl CategoryForm {
    async fn parse(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "image" {
                let file_name = field.file_name().unwrap_or("image").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("image read failed: {e}")))?;
                form.image = Some((file_name, bytes.to_vec()));
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("field read failed: {e}")))?;
            match name.as_str() {
                "name" => form.name = Some(value),
                "description" => form.description = Some(value),
                "is_active" => {
                    form.is_active = Some(value.parse().map_err(|_| {
                        AppError::BadRequest("invalid value for is_active".to_string())
                    })?);
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

/// GET /api/categories
///
/// Inactive categories are hidden unless the caller is an admin.
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Vec<CategoryResponse>>> {
    let is_admin = user.as_ref().is_some_and(|u| u.is_admin());
    let categories = CategoryRepository::new(state.db())
        .list(!is_admin)
        .await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// GET /api/categories/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>> {
    let id = parse_object_id(&id)?;
    let category = CategoryRepository::new(state.db())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("category".to_string()))?;
    Ok(Json(CategoryResponse::from(category)))
}

/// POST /api/categories (admin, multipart, image optional)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Json<CategoryResponse>> {
    let form = CategoryForm::parse(multipart).await?;
    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("missing field: name".to_string()))?;

    let image = match form.image {
        Some((file_name, bytes)) => Some(
            state
                .media()
                .upload_image(bytes, &file_name, IMAGE_FOLDER)
                .await?,
        ),
        None => None,
    };

    let mut category = Category {
        id: None,
        name,
        description: form.description.unwrap_or_default(),
        image,
        is_active: form.is_active.unwrap_or(true),
    };

    let id = CategoryRepository::new(state.db()).create(&category).await?;
    category.id = Some(id);
    tracing::info!(category = %id.to_hex(), name = %category.name, "category created");
    Ok(Json(CategoryResponse::from(category)))
}

/// PUT /api/categories/{id} (admin, multipart)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<CategoryResponse>> {
    let id = parse_object_id(&id)?;
    let form = CategoryForm::parse(multipart).await?;

    let mut set = bson::doc! {};
    if let Some(name) = form.name {
        set.insert("name", name);
    }
    if let Some(description) = form.description {
        set.insert("description", description);
    }
    if let Some(is_active) = form.is_active {
        set.insert("is_active", is_active);
    }
    if let Some((file_name, bytes)) = form.image {
        let url = state
            .media()
            .upload_image(bytes, &file_name, IMAGE_FOLDER)
            .await?;
        set.insert("image", url);
    }
    if set.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let repo = CategoryRepository::new(state.db());
    repo.update(id, set).await?;
    let category = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("category".to_string()))?;
    Ok(Json(CategoryResponse::from(category)))
}

/// DELETE /api/categories/{id} (admin)
///
/// Products referencing the category keep their dangling reference.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_object_id(&id)?;
    if !CategoryRepository::new(state.db()).delete(id).await? {
        return Err(AppError::NotFound("category".to_string()));
    }
    tracing::info!(category = %id.to_hex(), "category deleted");
    Ok(Json(serde_json::json!({ "message": "category deleted" })))
}
