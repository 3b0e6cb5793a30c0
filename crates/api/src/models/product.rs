//! Catalog product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::ProductId;

use super::Category;

/// A product with its category populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub rich_description: String,
    /// Main image URL.
    pub image: String,
    /// Gallery image URLs.
    pub images: Vec<String>,
    pub brand: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: Category,
    pub count_in_stock: i32,
    pub rating: f64,
    pub num_reviews: i32,
    pub is_featured: bool,
    pub date_created: DateTime<Utc>,
}
