//! User domain types.
//!
//! The password hash never leaves the database layer, so it has no field here.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Email, UserId};

/// A shop user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub is_admin: bool,
    pub street: String,
    pub apartment: String,
    pub zip: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}
