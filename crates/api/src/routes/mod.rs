//! HTTP route handlers.
//!
//! # Route Structure
//!
//! Everything below is nested under the configured API prefix (`/api/v1`).
//!
//! ```text
//! # Categories
//! GET    /categories                      - List categories
//! GET    /categories/{id}                 - Category detail
//! POST   /categories                      - Create category
//! PUT    /categories/{id}                 - Replace category
//! DELETE /categories/{id}                 - Delete category
//!
//! # Products
//! GET    /products?categories=a,b         - List products, optional category filter
//! GET    /products/{id}                   - Product detail
//! POST   /products                        - Create product
//! PUT    /products/{id}                   - Replace product
//! DELETE /products/{id}                   - Delete product
//! GET    /products/get/count              - Product count
//! GET    /products/get/featured/{count}   - Featured products
//! PUT    /products/gallery-images/{id}    - Replace gallery images
//!
//! # Users
//! GET    /users                           - List users
//! GET    /users/{id}                      - User detail
//! POST   /users                           - Create user
//! POST   /users/register                  - Register
//! POST   /users/login                     - Issue bearer token
//! GET    /users/me                        - Current user (bearer token)
//! PUT    /users/{id}                      - Update user
//! DELETE /users/{id}                      - Delete user
//! GET    /users/get/count                 - User count
//!
//! # Orders
//! GET    /orders                          - List orders
//! GET    /orders/{id}                     - Order detail, items populated
//! POST   /orders                          - Create order, total computed
//! PUT    /orders/{id}                     - Update status
//! DELETE /orders/{id}                     - Delete order and items
//! GET    /orders/get/totalsales           - Sum of order totals
//! GET    /orders/get/count                - Order count
//! GET    /orders/get/userorders/{userId}  - One user's orders
//! ```

pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{FromRequest, rejection::JsonRejection},
    routing::get,
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error format.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Body returned by successful deletes.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
    pub message: String,
}

impl Deleted {
    fn new(entity: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: format!("the {entity} is deleted!"),
        })
    }
}

/// Parse a path segment as a typed id.
fn parse_id<T: FromStr>(raw: &str, entity: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {entity} id")))
}

/// Trim a required text field, rejecting it when blank.
fn required(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    use axum::routing::put;

    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/get/count", get(products::count))
        .route("/get/featured/{count}", get(products::featured))
        .route("/gallery-images/{id}", put(products::gallery))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/me", get(users::me))
        .route("/get/count", get(users::count))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/get/totalsales", get(orders::total_sales))
        .route("/get/count", get(orders::count))
        .route("/get/userorders/{user_id}", get(orders::user_orders))
        .route(
            "/{id}",
            get(orders::show)
                .put(orders::update)
                .delete(orders::destroy),
        )
}

/// Create all JSON API routes, to be nested under the API prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/users", user_routes())
        .nest("/orders", order_routes())
}
