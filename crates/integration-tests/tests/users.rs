//! Integration tests for users, login, and bearer tokens.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`cargo run -p bazaar-cli -- migrate`)
//! - The API server running (`cargo run -p bazaar-api`)

use bazaar_integration_tests::{api_url, client, create_user, get_json, id_of, post_json};
use reqwest::StatusCode;
use serde_json::json;

const PASSWORD: &str = "correct horse battery";

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_hides_password_and_blocks_admin() {
    let client = client();
    let email = bazaar_integration_tests::unique_email();
    let (status, body) = post_json(
        &client,
        "/users/register",
        &json!({ "name": "Eve", "email": email, "password": PASSWORD, "isAdmin": true }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isAdmin"], false);
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_email_conflicts() {
    let client = client();
    let (_, email) = create_user(&client, PASSWORD).await;

    let (status, _) = post_json(
        &client,
        "/users",
        &json!({ "name": "Again", "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_and_me() {
    let client = client();
    let (user, email) = create_user(&client, PASSWORD).await;

    let (status, body) = post_json(
        &client,
        "/users/login",
        &json!({ "email": email, "password": "wrong password" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = post_json(
        &client,
        "/users/login",
        &json!({ "email": email.to_uppercase(), "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], email);
    let token = body["token"].as_str().expect("token is a string");

    let resp = client
        .get(format!("{}/users/me", api_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to call /users/me");
    assert_eq!(resp.status(), StatusCode::OK);
    let me: serde_json::Value = resp.json().await.expect("Response was not JSON");
    assert_eq!(me["id"], user["id"]);

    let resp = client
        .get(format!("{}/users/me", api_url()))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("Failed to call /users/me");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_without_password_keeps_login() {
    let client = client();
    let (user, email) = create_user(&client, PASSWORD).await;

    let resp = client
        .put(format!("{}/users/{}", api_url(), id_of(&user)))
        .json(&json!({ "name": "Renamed", "email": email, "city": "Shelbyville" }))
        .send()
        .await
        .expect("Failed to update user");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: serde_json::Value = resp.json().await.expect("Response was not JSON");
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["city"], "Shelbyville");

    let (status, _) = post_json(
        &client,
        "/users/login",
        &json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, count) = get_json(&client, "/users/get/count").await;
    assert_eq!(status, StatusCode::OK);
    assert!(count["userCount"].as_u64().unwrap_or(0) >= 1);
}
