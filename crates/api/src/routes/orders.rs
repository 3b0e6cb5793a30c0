//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{OrderId, OrderStatus, ProductId, UserId};

use super::{ApiJson, Deleted, parse_id, required};
use crate::db::OrderRepository;
use crate::db::orders::{MAX_LINE_QUANTITY, NewOrder, NewOrderLine};
use crate::error::{AppError, Result};
use crate::models::{OrderDetail, OrderSummary};
use crate::state::AppState;

/// One requested line of a new order.
#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub quantity: Option<i64>,
    #[serde(default)]
    pub product: String,
}

/// Request body for placing an order.
///
/// A client-supplied `totalPrice` is ignored; the total is always computed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub order_items: Vec<OrderLineRequest>,
    #[serde(default)]
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    pub status: Option<String>,
    #[serde(default)]
    pub user: String,
}

impl OrderRequest {
    fn validate(self) -> Result<NewOrder> {
        if self.order_items.is_empty() {
            return Err(AppError::BadRequest(
                "order must contain at least one item".to_string(),
            ));
        }

        let lines = self
            .order_items
            .iter()
            .map(OrderLineRequest::validate)
            .collect::<Result<Vec<_>>>()?;

        let user: UserId = self
            .user
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid user".to_string()))?;

        let status = match self.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => OrderStatus::default(),
        };

        Ok(NewOrder {
            user,
            lines,
            shipping_address1: required(&self.shipping_address1, "shippingAddress1")?,
            shipping_address2: self
                .shipping_address2
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            city: required(&self.city, "city")?,
            zip: required(&self.zip, "zip")?,
            country: required(&self.country, "country")?,
            phone: required(&self.phone, "phone")?,
            status,
        })
    }
}

impl OrderLineRequest {
    fn validate(&self) -> Result<NewOrderLine> {
        let product: ProductId = self
            .product
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid product {}", self.product)))?;

        let quantity = self
            .quantity
            .filter(|q| (1..=i64::from(MAX_LINE_QUANTITY)).contains(q))
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "item quantity must be between 1 and {MAX_LINE_QUANTITY}"
                ))
            })?;

        Ok(NewOrderLine { product, quantity })
    }
}

/// Request body for changing an order's status.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Response body for total sales.
#[derive(Debug, Serialize)]
pub struct TotalSales {
    #[serde(with = "rust_decimal::serde::float")]
    pub totalsales: Decimal,
}

/// Response body for the order count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCount {
    pub order_count: u64,
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse()
        .map_err(|e: bazaar_core::OrderStatusError| AppError::BadRequest(e.to_string()))
}

fn not_found() -> AppError {
    AppError::NotFound("The order with the given ID was not found.".to_string())
}

/// List all orders, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// Show one order with items, products, and categories populated.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>> {
    let id: OrderId = parse_id(&id, "order")?;

    let order = OrderRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(order))
}

/// Place an order, pricing every line from the catalog.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderSummary>)> {
    let new_order = body.validate()?;
    let orders = OrderRepository::new(state.pool());

    let id = orders.create(&new_order).await?;
    let order = orders
        .get_summary(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("order {id} missing after insert")))?;

    tracing::info!(
        order_id = %order.id,
        user_id = %order.user.id,
        total = %order.total_price,
        "Order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// Change an order's status.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<OrderSummary>> {
    let id: OrderId = parse_id(&id, "order")?;
    let status = parse_status(&body.status)?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, status)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(order_id = %id, %status, "Order status changed");

    Ok(Json(order))
}

/// Delete an order and its items.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let id: OrderId = parse_id(&id, "order")?;

    if !OrderRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("order not found!".to_string()));
    }

    tracing::info!(order_id = %id, "Order deleted");

    Ok(Deleted::new("order"))
}

/// Sum of all order totals.
#[instrument(skip(state))]
pub async fn total_sales(State(state): State<AppState>) -> Result<Json<TotalSales>> {
    let totalsales = OrderRepository::new(state.pool()).total_sales().await?;
    Ok(Json(TotalSales { totalsales }))
}

/// Count all orders.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<Json<OrderCount>> {
    let order_count = OrderRepository::new(state.pool()).count().await?;
    Ok(Json(OrderCount { order_count }))
}

/// One user's orders with items populated, newest first.
#[instrument(skip(state))]
pub async fn user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderDetail>>> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;

    Ok(Json(orders))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const USER: &str = "c1d2e3f4-0000-4000-8000-000000000001";
    const PRODUCT: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn order_json(items: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "orderItems": items,
            "shippingAddress1": "1 Main St",
            "city": "Springfield",
            "zip": "12345",
            "country": "US",
            "phone": "555-0100",
            "user": USER,
            "totalPrice": 0.01
        })
    }

    fn validate(json: serde_json::Value) -> Result<NewOrder> {
        serde_json::from_value::<OrderRequest>(json).unwrap().validate()
    }

    #[test]
    fn test_validate_builds_new_order() {
        let order = validate(order_json(serde_json::json!([
            { "quantity": 2, "product": PRODUCT },
            { "quantity": 1, "product": PRODUCT }
        ])))
        .unwrap();

        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user.to_string(), USER);
        assert_eq!(order.shipping_address2, None);
    }

    #[test]
    fn test_validate_rejects_empty_order() {
        let err = validate(order_json(serde_json::json!([]))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: order must contain at least one item"
        );
    }

    #[test]
    fn test_validate_rejects_bad_quantity() {
        for quantity in [
            serde_json::json!(0),
            serde_json::json!(-3),
            serde_json::json!(2_147_483_648_i64),
            serde_json::Value::Null,
        ] {
            let err = validate(order_json(serde_json::json!([
                { "quantity": quantity, "product": PRODUCT }
            ])))
            .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Bad request: item quantity must be between 1 and 2147483647"
            );
        }
    }

    #[test]
    fn test_validate_accepts_largest_storable_quantity() {
        let order = validate(order_json(serde_json::json!([
            { "quantity": i32::MAX, "product": PRODUCT }
        ])))
        .unwrap();
        assert_eq!(order.lines[0].quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_validate_rejects_bad_product_id() {
        let err = validate(order_json(serde_json::json!([
            { "quantity": 1, "product": "5f8d0d55b54764421b7156c3" }
        ])))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Invalid product 5f8d0d55b54764421b7156c3"
        );
    }

    #[test]
    fn test_validate_parses_status() {
        let mut json = order_json(serde_json::json!([{ "quantity": 1, "product": PRODUCT }]));
        json["status"] = serde_json::json!("shipped");
        assert_eq!(validate(json).unwrap().status, OrderStatus::Shipped);

        let mut json = order_json(serde_json::json!([{ "quantity": 1, "product": PRODUCT }]));
        json["status"] = serde_json::json!("lost");
        assert!(validate(json).is_err());
    }

    #[test]
    fn test_total_sales_serializes_as_number() {
        let json = serde_json::to_value(TotalSales {
            totalsales: Decimal::new(12_550, 2),
        })
        .unwrap();
        assert_eq!(json["totalsales"], 125.5);
    }
}
