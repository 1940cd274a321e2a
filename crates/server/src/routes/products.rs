//! Product catalog routes.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::db::{CategoryRepository, ProductRepository, parse_object_id};
use crate::db::products::ProductFilter;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::dto::ProductResponse;
use crate::models::product::PRODUCT_IMAGE_COUNT;
use crate::models::Product;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// CDN folder for product images.
const IMAGE_FOLDER: &str = "products";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub bestseller: Option<bool>,
    pub search: Option<String>,
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
}

/// GET /api/products
///
/// Inactive products are hidden unless the caller is an admin.
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let is_admin = user.as_ref().is_some_and(|u| u.is_admin());

    let category = match &query.category {
        Some(hex) => Some(parse_object_id(hex)?),
        None => None,
    };
    let filter = ProductFilter {
        category,
        featured: query.featured,
        bestseller: query.bestseller,
        search: query.search.clone(),
        active_only: !is_admin,
        skip: query.skip,
        limit: query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
    };

    let repo = ProductRepository::new(state.db());
    let products = repo.list(&filter).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(ListResponse {
        products: products.into_iter().map(ProductResponse::from).collect(),
        total,
    }))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let id = parse_object_id(&id)?;
    let product = ProductRepository::new(state.db())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    Ok(Json(ProductResponse::from(product)))
}

/// Text fields accepted by the multipart create/update forms.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    mrp: Option<f64>,
    category: Option<String>,
    brand: Option<String>,
    stock: Option<i64>,
    sizes: Option<Vec<String>>,
    is_featured: Option<bool>,
    is_bestseller: Option<bool>,
    is_active: Option<bool>,
    /// Raw image uploads, in form order.
    images: Vec<(String, Vec<u8>)>,
}

impl ProductForm {
    async fn parse(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "images" {
                let file_name = field.file_name().unwrap_or("image").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("image read failed: {e}")))?;
                form.images.push((file_name, bytes.to_vec()));
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("field read failed: {e}")))?;
            match name.as_str() {
                "name" => form.name = Some(value),
                "description" => form.description = Some(value),
                "price" => form.price = Some(parse_field("price", &value)?),
                "mrp" => form.mrp = Some(parse_field("mrp", &value)?),
                "category" => form.category = Some(value),
                "brand" => form.brand = Some(value),
                "stock" => form.stock = Some(parse_field("stock", &value)?),
                "sizes" => {
                    form.sizes = Some(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_owned)
                            .collect(),
                    );
                }
                "is_featured" => form.is_featured = Some(parse_field("is_featured", &value)?),
                "is_bestseller" => {
                    form.is_bestseller = Some(parse_field("is_bestseller", &value)?);
                }
                "is_active" => form.is_active = Some(parse_field("is_active", &value)?),
                _ => {} // unknown fields are ignored
            }
        }
        Ok(form)
    }
}

fn require(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| AppError::BadRequest(format!("missing field: {field}")))
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid value for {field}")))
}

/// Resolve and validate the category reference.
async fn active_category(state: &AppState, hex: &str) -> Result<bson::oid::ObjectId> {
    let id = parse_object_id(hex)?;
    let category = CategoryRepository::new(state.db())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::BadRequest("category does not exist".to_string()))?;
    if !category.is_active {
        return Err(AppError::BadRequest("category is not active".to_string()));
    }
    Ok(id)
}

/// Upload every image through the CDN, returning the URLs in form order.
async fn upload_images(state: &AppState, images: Vec<(String, Vec<u8>)>) -> Result<Vec<String>> {
    let mut urls = Vec::with_capacity(images.len());
    for (file_name, bytes) in images {
        let url = state.media().upload_image(bytes, &file_name, IMAGE_FOLDER).await?;
        urls.push(url);
    }
    Ok(urls)
}

/// POST /api/products (admin, multipart)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Json<ProductResponse>> {
    let form = ProductForm::parse(multipart).await?;

    let name = require(form.name.clone(), "name")?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest("missing field: price".to_string()))?;
    let stock = form
        .stock
        .ok_or_else(|| AppError::BadRequest("missing field: stock".to_string()))?;
    if price < 0.0 || stock < 0 {
        return Err(AppError::BadRequest(
            "price and stock must be non-negative".to_string(),
        ));
    }
    let category_hex = require(form.category.clone(), "category")?;
    let category = active_category(&state, &category_hex).await?;

    if form.images.len() != PRODUCT_IMAGE_COUNT {
        return Err(AppError::BadRequest(format!(
            "exactly {PRODUCT_IMAGE_COUNT} images are required, got {}",
            form.images.len()
        )));
    }
    let images = upload_images(&state, form.images).await?;

    let now = chrono::Utc::now();
    let mut product = Product {
        id: None,
        name,
        description: form.description.unwrap_or_default(),
        price,
        mrp: form.mrp.unwrap_or(price),
        category,
        brand: form.brand.unwrap_or_default(),
        stock,
        images,
        sizes: form.sizes.unwrap_or_default(),
        is_featured: form.is_featured.unwrap_or(false),
        is_bestseller: form.is_bestseller.unwrap_or(false),
        is_active: form.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    let id = ProductRepository::new(state.db()).create(&product).await?;
    product.id = Some(id);
    tracing::info!(product = %id.to_hex(), name = %product.name, "product created");
    Ok(Json(ProductResponse::from(product)))
}

/// PUT /api/products/{id} (admin, multipart)
///
/// Only fields present in the form are updated; replacement images are
/// optional and replace the whole set when provided.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>> {
    let id = parse_object_id(&id)?;
    let form = ProductForm::parse(multipart).await?;

    let mut set = bson::doc! {};
    if let Some(name) = form.name {
        set.insert("name", name);
    }
    if let Some(description) = form.description {
        set.insert("description", description);
    }
    if let Some(price) = form.price {
        if price < 0.0 {
            return Err(AppError::BadRequest("price must be non-negative".to_string()));
        }
        set.insert("price", price);
    }
    if let Some(mrp) = form.mrp {
        set.insert("mrp", mrp);
    }
    if let Some(category_hex) = form.category {
        let category = active_category(&state, &category_hex).await?;
        set.insert("category", category);
    }
    if let Some(brand) = form.brand {
        set.insert("brand", brand);
    }
    if let Some(stock) = form.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("stock must be non-negative".to_string()));
        }
        set.insert("stock", stock);
    }
    if let Some(sizes) = form.sizes {
        set.insert("sizes", sizes);
    }
    if let Some(is_featured) = form.is_featured {
        set.insert("is_featured", is_featured);
    }
    if let Some(is_bestseller) = form.is_bestseller {
        set.insert("is_bestseller", is_bestseller);
    }
    if let Some(is_active) = form.is_active {
        set.insert("is_active", is_active);
    }
    if !form.images.is_empty() {
        let images = upload_images(&state, form.images).await?;
        set.insert("images", images);
    }

    if set.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let repo = ProductRepository::new(state.db());
    repo.update(id, set).await?;
    let product = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    Ok(Json(ProductResponse::from(product)))
}

/// DELETE /api/products/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_object_id(&id)?;
    if !ProductRepository::new(state.db()).delete(id).await? {
        return Err(AppError::NotFound("product".to_string()));
    }
    tracing::info!(product = %id.to_hex(), "product deleted");
    Ok(Json(serde_json::json!({ "message": "product deleted" })))
}
