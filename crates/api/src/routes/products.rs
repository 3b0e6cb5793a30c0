//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{CategoryId, ProductId, validate_price};

use super::{ApiJson, Deleted, parse_id, required};
use crate::db::products::ProductInput;
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Most gallery images a product may carry.
const MAX_GALLERY_IMAGES: usize = 10;

/// Largest stock count a product may record.
const MAX_STOCK: i64 = 255;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    /// Comma-separated category ids.
    pub categories: Option<String>,
}

impl ProductFilter {
    fn category_ids(&self) -> Result<Option<Vec<CategoryId>>> {
        let Some(raw) = self.categories.as_deref() else {
            return Ok(None);
        };

        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_id(s, "category"))
            .collect::<Result<Vec<CategoryId>>>()?;

        Ok(if ids.is_empty() { None } else { Some(ids) })
    }
}

/// Request body for creating or replacing a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rich_description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub brand: String,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub count_in_stock: Option<i64>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: i64,
    #[serde(default)]
    pub is_featured: bool,
}

impl ProductRequest {
    fn validate(self) -> Result<ProductInput> {
        let name = required(&self.name, "name")?;
        let description = required(&self.description, "description")?;

        let category = self
            .category
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Invalid Category".to_string()))
            .and_then(|raw| {
                raw.parse::<CategoryId>()
                    .map_err(|_| AppError::BadRequest("Invalid Category".to_string()))
            })?;

        let price = validate_price(self.price.unwrap_or(Decimal::ZERO))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let count_in_stock = self
            .count_in_stock
            .filter(|n| (0..=MAX_STOCK).contains(n))
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!("countInStock must be between 0 and {MAX_STOCK}"))
            })?;

        if !self.rating.is_finite() || self.rating < 0.0 {
            return Err(AppError::BadRequest(
                "rating must be a non-negative number".to_string(),
            ));
        }

        let num_reviews = i32::try_from(self.num_reviews)
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| {
                AppError::BadRequest("numReviews must be a non-negative integer".to_string())
            })?;

        Ok(ProductInput {
            name,
            description,
            rich_description: self.rich_description,
            image: self.image.trim().to_string(),
            brand: self.brand.trim().to_string(),
            price,
            category,
            count_in_stock,
            rating: self.rating,
            num_reviews,
            is_featured: self.is_featured,
        })
    }
}

/// Request body for replacing a product's gallery.
#[derive(Debug, Deserialize)]
pub struct GalleryRequest {
    #[serde(default)]
    pub images: Vec<String>,
}

impl GalleryRequest {
    fn validate(self) -> Result<Vec<String>> {
        if self.images.len() > MAX_GALLERY_IMAGES {
            return Err(AppError::BadRequest(format!(
                "at most {MAX_GALLERY_IMAGES} gallery images are allowed"
            )));
        }

        self.images
            .iter()
            .map(|url| required(url, "image url"))
            .collect()
    }
}

/// Response body for the product count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCount {
    pub product_count: u64,
}

fn not_found() -> AppError {
    AppError::NotFound("The product with the given ID was not found.".to_string())
}

/// Reject inputs whose category doesn't exist.
async fn ensure_category(state: &AppState, id: CategoryId) -> Result<()> {
    if CategoryRepository::new(state.pool()).exists(id).await? {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid Category".to_string()))
    }
}

/// List products, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let categories = filter.category_ids()?;
    let products = ProductRepository::new(state.pool())
        .list(categories.as_deref())
        .await?;

    Ok(Json(products))
}

/// Show one product with its category.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "product")?;

    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(product))
}

/// Create a product.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = body.validate()?;
    ensure_category(&state, input.category).await?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(product_id = %product.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's editable fields.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProductRequest>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "product")?;
    let input = body.validate()?;
    ensure_category(&state, input.category).await?;

    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(product))
}

/// Delete a product that no order references.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let id: ProductId = parse_id(&id, "product")?;

    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("product not found!".to_string()));
    }

    tracing::info!(product_id = %id, "Product deleted");

    Ok(Deleted::new("product"))
}

/// Count all products.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<Json<ProductCount>> {
    let product_count = ProductRepository::new(state.pool()).count().await?;
    Ok(Json(ProductCount { product_count }))
}

/// List featured products; a count of zero means no limit.
#[instrument(skip(state))]
pub async fn featured(
    State(state): State<AppState>,
    Path(count): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let count: u32 = count
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid count".to_string()))?;
    let limit = (count > 0).then(|| i64::from(count));

    let products = ProductRepository::new(state.pool())
        .featured(limit)
        .await?;

    Ok(Json(products))
}

/// Replace a product's gallery images.
#[instrument(skip(state, body))]
pub async fn gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<GalleryRequest>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id, "product")?;
    let images = body.validate()?;

    let product = ProductRepository::new(state.pool())
        .set_gallery(id, &images)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(product))
}
