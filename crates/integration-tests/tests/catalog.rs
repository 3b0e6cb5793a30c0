//! Integration tests for categories and products.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`cargo run -p bazaar-cli -- migrate`)
//! - The API server running (`cargo run -p bazaar-api`)

use bazaar_integration_tests::{
    client, create_category, create_product, delete_json, get_json, id_of, post_json, server_url,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_health_endpoints() {
    let client = client();
    for path in ["/health", "/health/ready"] {
        let resp = client
            .get(format!("{}{path}", server_url()))
            .send()
            .await
            .expect("Failed to reach server");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_is_returned_with_category() {
    let client = client();
    let category = create_category(&client).await;
    let category_id = id_of(&category);
    let product = create_product(&client, &category_id, 19.99).await;

    assert_eq!(product["category"]["id"], category["id"]);
    assert_eq!(product["price"], 19.99);
    assert_eq!(product["countInStock"], 10);
    assert_eq!(product["isFeatured"], false);

    let (status, fetched) = get_json(&client, &format!("/products/{}", id_of(&product))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["category"]["name"], category["name"]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_list_filters_by_category() {
    let client = client();
    let a = id_of(&create_category(&client).await);
    let b = id_of(&create_category(&client).await);
    let in_a = id_of(&create_product(&client, &a, 5.0).await);
    let in_b = id_of(&create_product(&client, &b, 6.0).await);

    let (status, list) = get_json(&client, &format!("/products?categories={a}")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = list
        .as_array()
        .expect("list is an array")
        .iter()
        .filter_map(|p| p["id"].as_str())
        .collect();
    assert!(ids.contains(&in_a.as_str()));
    assert!(!ids.contains(&in_b.as_str()));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_with_unknown_category_is_rejected() {
    let client = client();
    let (status, body) = post_json(
        &client,
        "/products",
        &json!({
            "name": "Orphan",
            "description": "No such category",
            "category": uuid::Uuid::new_v4().to_string(),
            "countInStock": 1,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Category");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_category_with_products_cannot_be_deleted() {
    let client = client();
    let category_id = id_of(&create_category(&client).await);
    let product_id = id_of(&create_product(&client, &category_id, 1.0).await);

    let (status, _) = delete_json(&client, &format!("/categories/{category_id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = delete_json(&client, &format!("/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "the product is deleted!");

    let (status, body) = delete_json(&client, &format!("/categories/{category_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = get_json(&client, &format!("/categories/{category_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_gallery_and_featured() {
    let client = client();
    let category_id = id_of(&create_category(&client).await);
    let (status, product) = post_json(
        &client,
        "/products",
        &json!({
            "name": "Featured",
            "description": "Shown on the front page",
            "category": category_id,
            "countInStock": 3,
            "isFeatured": true,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = id_of(&product);

    let resp = client
        .put(format!(
            "{}/products/gallery-images/{product_id}",
            bazaar_integration_tests::api_url()
        ))
        .json(&json!({ "images": ["https://img.example/1.png", "https://img.example/2.png"] }))
        .send()
        .await
        .expect("Failed to update gallery");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: serde_json::Value = resp.json().await.expect("Response was not JSON");
    assert_eq!(updated["images"].as_array().map(Vec::len), Some(2));

    let (status, featured) = get_json(&client, "/products/get/featured/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(featured.as_array().map(Vec::len), Some(1));

    let (status, count) = get_json(&client, "/products/get/count").await;
    assert_eq!(status, StatusCode::OK);
    assert!(count["productCount"].as_u64().unwrap_or(0) >= 1);
}
