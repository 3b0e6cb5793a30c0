//! Bearer token storage.
//!
//! Tokens are stored as SHA-256 hex digests; the plaintext only ever exists
//! in the login response and the client's `Authorization` header.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::UserId;

use super::RepositoryError;
use crate::models::User;

/// Repository for API token operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a token hash for a user, pruning that user's expired tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either statement fails.
    pub async fn insert(
        &self,
        token_hash: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shop.api_token WHERE user_id = $1 AND expires_at <= NOW()")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO shop.api_token (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Resolve an unexpired token hash to its user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_user(&self, token_hash: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT u.id, u.name, u.email, u.phone, u.is_admin, u.street,
                   u.apartment, u.zip, u.city, u.country, u.created_at
            FROM shop.api_token t
            JOIN shop.user_account u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.expires_at > NOW()
            ",
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
