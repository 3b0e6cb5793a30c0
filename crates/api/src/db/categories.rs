//! Category repository.

use sqlx::PgPool;

use bazaar_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

/// Fields a client may set on a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, icon, color
            FROM shop.category
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, icon, color
            FROM shop.category
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get the first category with this exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, icon, color
            FROM shop.category
            WHERE name = $1
            ORDER BY created_at, id
            LIMIT 1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Check whether a category exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM shop.category WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.category (name, icon, color)
            VALUES ($1, $2, $3)
            RETURNING id, name, icon, color
            ",
        )
        .bind(&input.name)
        .bind(&input.icon)
        .bind(&input.color)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Replace a category's fields.
    ///
    /// Returns `None` if the category doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            r"
            UPDATE shop.category
            SET name = $2, icon = $3, color = $4
            WHERE id = $1
            RETURNING id, name, icon, color
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.icon)
        .bind(&input.color)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete a category.
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if products still belong to it.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_write(
                    e,
                    "category already exists",
                    "category still has products",
                )
            })?;

        Ok(result.rows_affected() > 0)
    }
}
