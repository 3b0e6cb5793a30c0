//! Product repository.
//!
//! Every read joins the owning category so products come back populated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::{CategoryId, ProductId};

use super::{RepositoryError, to_count};
use crate::models::{Category, Product};

/// Column list for a product joined to its category as `p` and `c`.
pub(crate) const PRODUCT_COLUMNS: &str = r"
    p.id, p.name, p.description, p.rich_description, p.image, p.images,
    p.brand, p.price, p.count_in_stock, p.rating, p.num_reviews,
    p.is_featured, p.date_created,
    c.id AS category_id, c.name AS category_name,
    c.icon AS category_icon, c.color AS category_color
";

/// Database row for a product joined to its category.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    rich_description: String,
    image: String,
    images: Vec<String>,
    brand: String,
    price: Decimal,
    count_in_stock: i32,
    rating: f64,
    num_reviews: i32,
    is_featured: bool,
    date_created: DateTime<Utc>,
    category_id: CategoryId,
    category_name: String,
    category_icon: Option<String>,
    category_color: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            rich_description: row.rich_description,
            image: row.image,
            images: row.images,
            brand: row.brand,
            price: row.price,
            category: Category {
                id: row.category_id,
                name: row.category_name,
                icon: row.category_icon,
                color: row.category_color,
            },
            count_in_stock: row.count_in_stock,
            rating: row.rating,
            num_reviews: row.num_reviews,
            is_featured: row.is_featured,
            date_created: row.date_created,
        }
    }
}

/// Validated fields for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub rich_description: String,
    pub image: String,
    pub brand: String,
    pub price: Decimal,
    pub category: CategoryId,
    pub count_in_stock: i32,
    pub rating: f64,
    pub num_reviews: i32,
    pub is_featured: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, optionally restricted to a set of categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        categories: Option<&[CategoryId]>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let filter: Option<Vec<Uuid>> =
            categories.map(|ids| ids.iter().map(CategoryId::as_uuid).collect());

        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            JOIN shop.category c ON c.id = p.category_id
            WHERE $1::uuid[] IS NULL OR p.category_id = ANY($1)
            ORDER BY p.date_created DESC, p.id
            "
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            JOIN shop.category c ON c.id = p.category_id
            WHERE p.id = $1
            "
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category vanished concurrently.
    /// Returns `RepositoryError::InvalidInput` if a column check fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let sql = format!(
            r"
            WITH p AS (
                INSERT INTO shop.product (
                    name, description, rich_description, image, brand, price,
                    category_id, count_in_stock, rating, num_reviews, is_featured
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS}
            FROM p
            JOIN shop.category c ON c.id = p.category_id
            "
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.rich_description)
            .bind(&input.image)
            .bind(&input.brand)
            .bind(input.price)
            .bind(input.category)
            .bind(input.count_in_stock)
            .bind(input.rating)
            .bind(input.num_reviews)
            .bind(input.is_featured)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "product already exists", "category not found")
            })?;

        Ok(row.into())
    }

    /// Replace every editable field of a product.
    ///
    /// Returns `None` if the product doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category vanished concurrently.
    /// Returns `RepositoryError::InvalidInput` if a column check fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            r"
            WITH p AS (
                UPDATE shop.product
                SET name = $2, description = $3, rich_description = $4,
                    image = $5, brand = $6, price = $7, category_id = $8,
                    count_in_stock = $9, rating = $10, num_reviews = $11,
                    is_featured = $12
                WHERE id = $1
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS}
            FROM p
            JOIN shop.category c ON c.id = p.category_id
            "
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.rich_description)
            .bind(&input.image)
            .bind(&input.brand)
            .bind(input.price)
            .bind(input.category)
            .bind(input.count_in_stock)
            .bind(input.rating)
            .bind(input.num_reviews)
            .bind(input.is_featured)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "product already exists", "category not found")
            })?;

        Ok(row.map(Product::from))
    }

    /// Replace a product's gallery images.
    ///
    /// Returns `None` if the product doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_gallery(
        &self,
        id: ProductId,
        images: &[String],
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            r"
            WITH p AS (
                UPDATE shop.product
                SET images = $2
                WHERE id = $1
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS}
            FROM p
            JOIN shop.category c ON c.id = p.category_id
            "
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(images)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if order items still reference it.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_write(
                    e,
                    "product already exists",
                    "product is part of existing orders",
                )
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.product")
            .fetch_one(self.pool)
            .await?;

        Ok(to_count(count))
    }

    /// List featured products, newest first.
    ///
    /// `limit` of `None` returns all of them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: Option<i64>) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            JOIN shop.category c ON c.id = p.category_id
            WHERE p.is_featured
            ORDER BY p.date_created DESC, p.id
            LIMIT $1
            "
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
