//! User route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{Email, UserId};

use super::{ApiJson, Deleted, parse_id, required};
use crate::db::UserRepository;
use crate::db::users::UserProfile;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Request body for creating, registering, or updating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub password: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub apartment: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl UserRequest {
    fn profile(&self) -> Result<UserProfile> {
        let email = Email::parse(&self.email)
            .map_err(|_| AppError::BadRequest("Invalid email address".to_string()))?;

        Ok(UserProfile {
            name: required(&self.name, "name")?,
            email,
            phone: self.phone.trim().to_string(),
            is_admin: self.is_admin,
            street: self.street.trim().to_string(),
            apartment: self.apartment.trim().to_string(),
            zip: self.zip.trim().to_string(),
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
        })
    }

    fn password(&self) -> Result<&str> {
        self.password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("password is required".to_string()))
    }
}

/// Request body for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The user's email address.
    pub user: String,
    /// Opaque bearer token.
    pub token: String,
}

/// Response body for the user count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCount {
    pub user_count: u64,
}

fn not_found() -> AppError {
    AppError::NotFound("The user with the given ID was not found.".to_string())
}

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.config().token_ttl)
}

/// List all users.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// Show one user.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let id: UserId = parse_id(&id, "user")?;

    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(user))
}

/// Create a user, admin flag included.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let profile = body.profile()?;
    let user = auth_service(&state)
        .register(&profile, body.password()?)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Public registration; never grants admin.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let profile = UserProfile {
        is_admin: false,
        ..body.profile()?
    };
    let user = auth_service(&state)
        .register(&profile, body.password()?)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user's profile; the password changes only when one is given.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UserRequest>,
) -> Result<Json<User>> {
    let id: UserId = parse_id(&id, "user")?;
    let profile = body.profile()?;
    let password = body.password.as_deref().filter(|p| !p.is_empty());

    let user = auth_service(&state)
        .update(id, &profile, password)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(user))
}

/// Verify credentials and issue a bearer token.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, token) = auth_service(&state)
        .login(&body.email, &body.password)
        .await?;

    Ok(Json(LoginResponse {
        user: user.email.into_inner(),
        token,
    }))
}

/// The user owning the bearer token.
#[instrument(skip_all)]
pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

/// Count all users.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<Json<UserCount>> {
    let user_count = UserRepository::new(state.pool()).count().await?;
    Ok(Json(UserCount { user_count }))
}

/// Delete a user without orders.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let id: UserId = parse_id(&id, "user")?;

    if !UserRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("user not found!".to_string()));
    }

    tracing::info!(user_id = %id, "User deleted");

    Ok(Deleted::new("user"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> UserRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_profile_normalizes_email() {
        let profile = request(serde_json::json!({
            "name": "Ada",
            "email": " Ada@Example.COM ",
            "isAdmin": true,
            "city": " London "
        }))
        .profile()
        .unwrap();

        assert_eq!(profile.email.as_str(), "ada@example.com");
        assert!(profile.is_admin);
        assert_eq!(profile.city, "London");
        assert_eq!(profile.street, "");
    }

    #[test]
    fn test_profile_rejects_bad_email() {
        let err = request(serde_json::json!({ "name": "Ada", "email": "ada" }))
            .profile()
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid email address");
    }

    #[test]
    fn test_password_is_required_for_create() {
        let req = request(serde_json::json!({ "name": "Ada", "email": "ada@example.com" }));
        assert!(matches!(req.password(), Err(AppError::BadRequest(_))));

        let req = request(serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2hunter2"
        }));
        assert_eq!(req.password().unwrap(), "hunter2hunter2");
    }
}
