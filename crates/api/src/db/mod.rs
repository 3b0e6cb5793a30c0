//! Database operations for the shop `PostgreSQL` schema.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `category` - Product categories
//! - `product` - Catalog entries, each in exactly one category
//! - `user_account` - Shop users (argon2 password hashes)
//! - `api_token` - SHA-256 hashes of issued bearer tokens
//! - `customer_order` - Orders with their computed total
//! - `order_item` - Order lines, deleted with their order
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod categories;
pub mod orders;
pub mod products;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., unique email, row still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The write referenced something that does not exist or is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RepositoryError {
    /// Classify a write error, turning constraint violations into `Conflict`.
    ///
    /// `unique` describes a duplicate key, `referenced` a foreign key
    /// violation (e.g. deleting a category that still has products).
    pub(crate) fn from_write(e: sqlx::Error, unique: &str, referenced: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return Self::Conflict(unique.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Conflict(referenced.to_owned());
            }
            if db_err.is_check_violation() {
                return Self::InvalidInput(db_err.message().to_owned());
            }
            // numeric_value_out_of_range
            if db_err.code().as_deref() == Some("22003") {
                return Self::InvalidInput("value out of range".to_owned());
            }
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a `COUNT(*)` result to an unsigned count.
pub(crate) fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}
