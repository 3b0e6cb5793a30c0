//! Integration tests for order placement and totals.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`cargo run -p bazaar-cli -- migrate`)
//! - The API server running (`cargo run -p bazaar-api`)

use bazaar_integration_tests::{
    api_url, client, create_category, create_product, create_user, delete_json, get_json, id_of,
    post_json,
};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn place_order(client: &Client, user_id: &str, items: Value) -> (StatusCode, Value) {
    post_json(
        client,
        "/orders",
        &json!({
            "orderItems": items,
            "shippingAddress1": "742 Evergreen Terrace",
            "city": "Springfield",
            "zip": "49007",
            "country": "US",
            "phone": "555-0100",
            "user": user_id,
            "totalPrice": 0.01,
        }),
    )
    .await
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_total_is_computed_from_catalog_prices() {
    let client = client();
    let category_id = id_of(&create_category(&client).await);
    let shoe = id_of(&create_product(&client, &category_id, 19.99).await);
    let sock = id_of(&create_product(&client, &category_id, 5.50).await);
    let (user, _) = create_user(&client, "correct horse battery").await;
    let user_id = id_of(&user);

    let (status, order) = place_order(
        &client,
        &user_id,
        json!([
            { "quantity": 2, "product": shoe },
            { "quantity": 1, "product": sock },
            { "quantity": 1, "product": shoe },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["totalPrice"], 65.47);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["user"]["id"], user["id"]);
    assert_eq!(order["orderItems"].as_array().map(Vec::len), Some(3));

    let (status, detail) = get_json(&client, &format!("/orders/{}", id_of(&order))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["orderItems"][0]["quantity"], 2);
    assert_eq!(detail["orderItems"][0]["product"]["id"], shoe.as_str());
    assert_eq!(
        detail["orderItems"][0]["product"]["category"]["id"],
        category_id.as_str()
    );

    let (status, mine) = get_json(&client, &format!("/orders/get/userorders/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_product_is_rejected() {
    let client = client();
    let (user, _) = create_user(&client, "correct horse battery").await;
    let missing = uuid::Uuid::new_v4().to_string();

    let (status, body) = place_order(
        &client,
        &id_of(&user),
        json!([{ "quantity": 1, "product": missing }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], format!("Invalid product {missing}"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_user_is_rejected() {
    let client = client();
    let category_id = id_of(&create_category(&client).await);
    let product_id = id_of(&create_product(&client, &category_id, 4.0).await);

    let (status, body) = place_order(
        &client,
        &uuid::Uuid::new_v4().to_string(),
        json!([{ "quantity": 1, "product": product_id }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_failed_order_leaves_nothing_behind() {
    let client = client();
    let category_id = id_of(&create_category(&client).await);
    let product_id = id_of(&create_product(&client, &category_id, 7.25).await);
    let (user, _) = create_user(&client, "correct horse battery").await;
    let user_id = id_of(&user);

    let (status, _) = place_order(
        &client,
        &user_id,
        json!([
            { "quantity": 2, "product": product_id },
            { "quantity": 1, "product": uuid::Uuid::new_v4().to_string() },
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, mine) = get_json(&client, &format!("/orders/get/userorders/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(0));

    // No order item pins the product either.
    let (status, _) = delete_json(&client, &format!("/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_total_beyond_stored_range_is_rejected() {
    let client = client();
    let category_id = id_of(&create_category(&client).await);
    let product_id = id_of(&create_product(&client, &category_id, 9_999_999_999.99).await);
    let (user, _) = create_user(&client, "correct horse battery").await;

    let (status, body) = place_order(
        &client,
        &id_of(&user),
        json!([{ "quantity": 1000, "product": product_id }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "order total must be less than 1000000000000");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_status_update_and_delete() {
    let client = client();
    let category_id = id_of(&create_category(&client).await);
    let product_id = id_of(&create_product(&client, &category_id, 10.0).await);
    let (user, _) = create_user(&client, "correct horse battery").await;

    let (_, order) = place_order(
        &client,
        &id_of(&user),
        json!([{ "quantity": 3, "product": product_id }]),
    )
    .await;
    let order_id = id_of(&order);

    let resp = client
        .put(format!("{}/orders/{order_id}", api_url()))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .expect("Failed to update order");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Response was not JSON");
    assert_eq!(updated["status"], "Shipped");

    // Ordered products can't be deleted while the order exists.
    let (status, _) = delete_json(&client, &format!("/products/{product_id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = delete_json(&client, &format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "the order is deleted!");

    let (status, _) = get_json(&client, &format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete_json(&client, &format!("/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_sales_and_count() {
    let client = client();

    let (status, sales) = get_json(&client, "/orders/get/totalsales").await;
    assert_eq!(status, StatusCode::OK);
    assert!(sales["totalsales"].is_number());

    let (status, count) = get_json(&client, "/orders/get/count").await;
    assert_eq!(status, StatusCode::OK);
    assert!(count["orderCount"].is_u64());
}
