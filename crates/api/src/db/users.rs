//! User repository for database operations.
//!
//! Password hashes are read only by [`UserRepository::get_password_hash`];
//! every other query leaves the column out.

use sqlx::PgPool;

use bazaar_core::{Email, UserId};

use super::{RepositoryError, to_count};
use crate::models::User;

const USER_COLUMNS: &str = r"
    id, name, email, phone, is_admin, street, apartment, zip, city, country, created_at
";

/// Validated profile fields for creating or updating a user.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub is_admin: bool,
    pub street: String,
    pub apartment: String,
    pub zip: String,
    pub city: String,
    pub country: String,
}

#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM shop.user_account ORDER BY created_at, id");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(self.pool).await?;

        Ok(users)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM shop.user_account WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.user_account WHERE email = $1"
        );
        let row = sqlx::query_as::<_, UserWithHash>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO shop.user_account (
                name, email, password_hash, phone, is_admin,
                street, apartment, zip, city, country
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(password_hash)
            .bind(&profile.phone)
            .bind(profile.is_admin)
            .bind(&profile.street)
            .bind(&profile.apartment)
            .bind(&profile.zip)
            .bind(&profile.city)
            .bind(&profile.country)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "email already exists", "user not found"))?;

        Ok(user)
    }

    /// Update a user's profile, and their password when a new hash is given.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email belongs to another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: UserId,
        profile: &UserProfile,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            r"
            UPDATE shop.user_account
            SET name = $2, email = $3, phone = $4, is_admin = $5,
                street = $6, apartment = $7, zip = $8, city = $9, country = $10,
                password_hash = COALESCE($11, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.phone)
            .bind(profile.is_admin)
            .bind(&profile.street)
            .bind(&profile.apartment)
            .bind(&profile.zip)
            .bind(&profile.city)
            .bind(&profile.country)
            .bind(password_hash)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "email already exists", "user not found"))?;

        Ok(user)
    }

    /// Delete a user.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if they didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user still has orders.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.user_account WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "email already exists", "user still has orders")
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.user_account")
            .fetch_one(self.pool)
            .await?;

        Ok(to_count(count))
    }
}
