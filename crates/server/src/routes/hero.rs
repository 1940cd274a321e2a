//! Hero banner routes.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::db::{HeroRepository, parse_object_id};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::HeroSlide;
use crate::models::dto::HeroSlideResponse;
use crate::state::AppState;

/// CDN folder for hero images.
const IMAGE_FOLDER: &str = "hero";

#[derive(Debug, Default)]
struct HeroForm {
    title: Option<String>,
    subtitle: Option<String>,
    button_text: Option<String>,
    order: Option<i32>,
    is_active: Option<bool>,
    image: Option<(String, Vec<u8>)>,
}

impl HeroForm {
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
                "title" => form.title = Some(value),
                "subtitle" => form.subtitle = Some(value),
                "button_text" => form.button_text = Some(value),
                "order" => {
                    form.order = Some(value.parse().map_err(|_| {
                        AppError::BadRequest("invalid value for order".to_string())
                    })?);
                }
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

/// GET /api/hero — active slides, carousel order.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<HeroSlideResponse>>> {
    let slides = HeroRepository::new(state.db()).list_active().await?;
    Ok(Json(
        slides.into_iter().map(HeroSlideResponse::from).collect(),
    ))
}

/// GET /api/hero/all (admin) — every slide regardless of active flag.
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<HeroSlideResponse>>> {
    let slides = HeroRepository::new(state.db()).list_all().await?;
    Ok(Json(
        slides.into_iter().map(HeroSlideResponse::from).collect(),
    ))
}

/// POST /api/hero (admin, multipart, image required)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Json<HeroSlideResponse>> {
    let form = HeroForm::parse(multipart).await?;
    let title = form
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("missing field: title".to_string()))?;
    let (file_name, bytes) = form
        .image
        .ok_or_else(|| AppError::BadRequest("missing field: image".to_string()))?;

    let image = state
        .media()
        .upload_image(bytes, &file_name, IMAGE_FOLDER)
        .await?;

    let mut slide = HeroSlide {
        id: None,
        title,
        subtitle: form.subtitle.unwrap_or_default(),
        button_text: form.button_text.unwrap_or_default(),
        image,
        order: form.order.unwrap_or(0),
        is_active: form.is_active.unwrap_or(true),
    };

    let id = HeroRepository::new(state.db()).create(&slide).await?;
    slide.id = Some(id);
    tracing::info!(slide = %id.to_hex(), title = %slide.title, "hero slide created");
    Ok(Json(HeroSlideResponse::from(slide)))
}

/// PUT /api/hero/{id} (admin, multipart)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let id = parse_object_id(&id)?;
    let form = HeroForm::parse(multipart).await?;

    let mut set = bson::doc! {};
    if let Some(title) = form.title {
        set.insert("title", title);
    }
    if let Some(subtitle) = form.subtitle {
        set.insert("subtitle", subtitle);
    }
    if let Some(button_text) = form.button_text {
        set.insert("button_text", button_text);
    }
    if let Some(order) = form.order {
        set.insert("order", order);
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

    HeroRepository::new(state.db()).update(id, set).await?;
    Ok(Json(serde_json::json!({ "message": "hero slide updated" })))
}

/// DELETE /api/hero/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_object_id(&id)?;
    if !HeroRepository::new(state.db()).delete(id).await? {
        return Err(AppError::NotFound("hero slide".to_string()));
    }
    Ok(Json(serde_json::json!({ "message": "hero slide deleted" })))
}
