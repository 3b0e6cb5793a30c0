//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Footwear
//!     icon: shoe
//!     color: "#e76f51"
//!     products:
//!       - name: Trail Runner
//!         description: Lightweight trail shoe
//!         price: 89.99
//!         countInStock: 25
//!         isFeatured: true
//! ```
//!
//! Categories are matched by name, so re-running the seed adds products to
//! existing categories instead of duplicating them.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use bazaar_api::db::categories::CategoryInput;
use bazaar_api::db::products::ProductInput;
use bazaar_api::db::{CategoryRepository, ProductRepository};
use bazaar_core::validate_price;

use super::{CommandError, connect};

/// Top-level shape of a catalog seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// A category and the products filed under it.
#[derive(Debug, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSeed {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub rich_description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price: Decimal,
    pub count_in_stock: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: i32,
    #[serde(default)]
    pub is_featured: bool,
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories_created: usize,
    pub categories_reused: usize,
    pub products_created: usize,
}

/// Check a parsed seed file, returning every problem found.
pub fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();

    for category in &seed.categories {
        if category.name.trim().is_empty() {
            errors.push("category with empty name".to_owned());
        }
        for product in &category.products {
            let label = format!("{}/{}", category.name, product.name);
            if product.name.trim().is_empty() {
                errors.push(format!("{label}: empty product name"));
            }
            if product.description.trim().is_empty() {
                errors.push(format!("{label}: empty description"));
            }
            if let Err(e) = validate_price(product.price) {
                errors.push(format!("{label}: {e}"));
            }
            if !(0..=255).contains(&product.count_in_stock) {
                errors.push(format!("{label}: countInStock must be between 0 and 255"));
            }
            if product.num_reviews < 0 {
                errors.push(format!("{label}: numReviews must not be negative"));
            }
        }
    }

    errors
}

/// Seed categories and products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `clear_existing` - If true, delete all orders, products, and categories first
///
/// # Errors
///
/// Returns an error if the file can't be read or validated, or a database
/// operation fails.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<SeedSummary, CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(CommandError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }

    let pool = connect().await?;

    if clear_existing {
        tracing::warn!("Clearing orders, products, and categories");
        let mut tx = pool.begin().await?;
        for table in ["order_item", "customer_order", "product", "category"] {
            sqlx::query(&format!("DELETE FROM shop.{table}"))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
    }

    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let mut summary = SeedSummary::default();

    for category_seed in seed.categories {
        let name = category_seed.name.trim().to_owned();

        let category = if let Some(existing) = categories.get_by_name(&name).await? {
            summary.categories_reused += 1;
            existing
        } else {
            summary.categories_created += 1;
            categories
                .create(&CategoryInput {
                    name,
                    icon: category_seed.icon,
                    color: category_seed.color,
                })
                .await?
        };

        for product_seed in category_seed.products {
            let images = product_seed.images.clone();
            let product = products
                .create(&ProductInput {
                    name: product_seed.name.trim().to_owned(),
                    description: product_seed.description,
                    rich_description: product_seed.rich_description,
                    image: product_seed.image,
                    brand: product_seed.brand,
                    price: product_seed.price,
                    category: category.id,
                    count_in_stock: product_seed.count_in_stock,
                    rating: product_seed.rating,
                    num_reviews: product_seed.num_reviews,
                    is_featured: product_seed.is_featured,
                })
                .await?;

            if !images.is_empty() {
                products.set_gallery(product.id, &images).await?;
            }
            summary.products_created += 1;
        }
    }

    info!("Seeding complete!");
    info!("  Categories created: {}", summary.categories_created);
    info!("  Categories reused: {}", summary.categories_reused);
    info!("  Products created: {}", summary.products_created);

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_is_valid() {
        let content = include_str!("../../seed/catalog.yaml");
        let seed: CatalogSeed = serde_yaml::from_str(content).unwrap();
        assert!(!seed.categories.is_empty());
        assert!(validate(&seed).is_empty(), "{:?}", validate(&seed));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let seed: CatalogSeed = serde_yaml::from_str(
            r"
categories:
  - name: Shoes
    products:
      - name: Broken
        description: ''
        price: -1
        countInStock: 300
",
        )
        .unwrap();

        let errors = validate(&seed);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.starts_with("Shoes/Broken")));
    }

    #[test]
    fn test_product_defaults() {
        let seed: CatalogSeed = serde_yaml::from_str(
            r"
categories:
  - name: Hats
    products:
      - name: Cap
        description: Plain cap
        countInStock: 4
",
        )
        .unwrap();

        let product = &seed.categories[0].products[0];
        assert_eq!(product.price, Decimal::ZERO);
        assert!(product.images.is_empty());
        assert!(!product.is_featured);
    }
}
