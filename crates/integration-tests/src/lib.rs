//! Black-box HTTP tests for the Bazaar API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a scratch database and start the server
//! cargo run -p bazaar-cli -- migrate
//! cargo run -p bazaar-api
//!
//! # Run the ignored tests against it
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! `BAZAAR_TEST_URL` overrides the API base (default
//! `http://localhost:3000/api/v1`).

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the JSON API, prefix included.
#[must_use]
pub fn api_url() -> String {
    std::env::var("BAZAAR_TEST_URL")
        .unwrap_or_else(|_| "http://localhost:3000/api/v1".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Server root, derived from [`api_url`] by dropping the path.
#[must_use]
pub fn server_url() -> String {
    root_of(&api_url())
}

fn root_of(url: &str) -> String {
    let after_scheme = url.find("://").map_or(0, |i| i + 3);
    url.get(after_scheme..)
        .and_then(|rest| rest.find('/'))
        .and_then(|slash| url.get(..after_scheme + slash))
        .unwrap_or(url)
        .to_string()
}

/// Plain HTTP client.
///
/// # Panics
///
/// Panics if the client can't be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Email address no other test run will use.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

/// POST JSON and return the status with the parsed body.
///
/// # Panics
///
/// Panics if the request fails or the body isn't JSON.
pub async fn post_json(client: &Client, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{}{path}", api_url()))
        .json(body)
        .send()
        .await
        .expect("Failed to send request");
    let status = resp.status();
    (status, resp.json().await.expect("Response was not JSON"))
}

/// GET and return the status with the parsed body.
///
/// # Panics
///
/// Panics if the request fails or the body isn't JSON.
pub async fn get_json(client: &Client, path: &str) -> (StatusCode, Value) {
    let resp = client
        .get(format!("{}{path}", api_url()))
        .send()
        .await
        .expect("Failed to send request");
    let status = resp.status();
    (status, resp.json().await.expect("Response was not JSON"))
}

/// DELETE and return the status with the parsed body.
///
/// # Panics
///
/// Panics if the request fails or the body isn't JSON.
pub async fn delete_json(client: &Client, path: &str) -> (StatusCode, Value) {
    let resp = client
        .delete(format!("{}{path}", api_url()))
        .send()
        .await
        .expect("Failed to send request");
    let status = resp.status();
    (status, resp.json().await.expect("Response was not JSON"))
}

/// Id field of a created entity.
///
/// # Panics
///
/// Panics if the body has no string `id`.
#[must_use]
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("Body has no id").to_string()
}

/// Create a category with a unique name.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_category(client: &Client) -> Value {
    let (status, body) = post_json(
        client,
        "/categories",
        &json!({ "name": format!("Test {}", Uuid::new_v4()), "icon": "tag" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

/// Create a product in a category.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_product(client: &Client, category_id: &str, price: f64) -> Value {
    let (status, body) = post_json(
        client,
        "/products",
        &json!({
            "name": "Test Product",
            "description": "Created by integration tests",
            "price": price,
            "category": category_id,
            "countInStock": 10,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

/// Register a user with a unique email; returns the body and email.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn create_user(client: &Client, password: &str) -> (Value, String) {
    let email = unique_email();
    let (status, body) = post_json(
        client,
        "/users/register",
        &json!({
            "name": "Test User",
            "email": email,
            "password": password,
            "phone": "555-0100",
            "city": "Springfield",
            "country": "US",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (body, email)
}
