//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::CategoryId;

use super::{ApiJson, Deleted, parse_id, required};
use crate::db::CategoryRepository;
use crate::db::categories::CategoryInput;
use crate::error::{AppError, Result};
use crate::models::Category;
use crate::state::AppState;

/// Request body for creating or replacing a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategoryRequest {
    fn validate(self) -> Result<CategoryInput> {
        Ok(CategoryInput {
            name: required(&self.name, "name")?,
            icon: self.icon.filter(|s| !s.trim().is_empty()),
            color: self.color.filter(|s| !s.trim().is_empty()),
        })
    }
}

fn not_found() -> AppError {
    AppError::NotFound("The category with the given ID was not found.".to_string())
}

/// List all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// Show one category.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Category>> {
    let id: CategoryId = parse_id(&id, "category")?;

    let category = CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(category))
}

/// Create a category.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let input = body.validate()?;
    let category = CategoryRepository::new(state.pool()).create(&input).await?;

    tracing::info!(category_id = %category.id, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Replace a category's fields.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<Json<Category>> {
    let id: CategoryId = parse_id(&id, "category")?;
    let input = body.validate()?;

    let category = CategoryRepository::new(state.pool())
        .update(id, &input)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(category))
}

/// Delete a category that no product uses.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let id: CategoryId = parse_id(&id, "category")?;

    if !CategoryRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("category not found!".to_string()));
    }

    tracing::info!(category_id = %id, "Category deleted");

    Ok(Deleted::new("category"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_name() {
        let req: CategoryRequest = serde_json::from_str(r#"{"icon":"shoe"}"#).unwrap();
        assert!(matches!(req.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_validate_drops_blank_optionals() {
        let req: CategoryRequest =
            serde_json::from_str(r##"{"name":" Shoes ","icon":"","color":"#ff0000"}"##).unwrap();
        let input = req.validate().unwrap();
        assert_eq!(input.name, "Shoes");
        assert_eq!(input.icon, None);
        assert_eq!(input.color.as_deref(), Some("#ff0000"));
    }
}
