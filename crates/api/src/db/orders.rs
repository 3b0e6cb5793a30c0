//! Order repository.
//!
//! Orders are always read with their user's name. Detail reads also load
//! every item with its product and that product's category.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::{
    LineItem, OrderId, OrderItemId, OrderStatus, ProductId, UserId, order_total, validate_total,
};

use super::products::{PRODUCT_COLUMNS, ProductRow};
use super::{RepositoryError, to_count};
use crate::models::{OrderDetail, OrderItem, OrderSummary, UserRef};

/// Order columns plus the user's name and the ordered item ids.
///
/// Callers append a `WHERE` clause, then `GROUP BY o.id, u.name`.
const ORDER_SELECT: &str = r"
    SELECT o.id, o.user_id, u.name AS user_name,
           o.shipping_address1, o.shipping_address2, o.city, o.zip,
           o.country, o.phone, o.status, o.total_price, o.date_ordered,
           COALESCE(
               ARRAY_AGG(oi.id ORDER BY oi.position) FILTER (WHERE oi.id IS NOT NULL),
               '{}'::uuid[]
           ) AS item_ids
    FROM shop.customer_order o
    JOIN shop.user_account u ON u.id = o.user_id
    LEFT JOIN shop.order_item oi ON oi.order_id = o.id
";

/// One requested order line.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderLine {
    pub product: ProductId,
    /// Between 1 and [`MAX_LINE_QUANTITY`].
    pub quantity: u32,
}

/// Largest quantity a single order line can store.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// A validated order ready to be priced and stored.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user: UserId,
    pub lines: Vec<NewOrderLine>,
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub status: OrderStatus,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    user_name: String,
    shipping_address1: String,
    shipping_address2: Option<String>,
    city: String,
    zip: String,
    country: String,
    phone: String,
    status: OrderStatus,
    total_price: Decimal,
    date_ordered: DateTime<Utc>,
    item_ids: Vec<Uuid>,
}

impl From<OrderRow> for OrderSummary {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_items: row.item_ids.into_iter().map(OrderItemId::new).collect(),
            shipping_address1: row.shipping_address1,
            shipping_address2: row.shipping_address2,
            city: row.city,
            zip: row.zip,
            country: row.country,
            phone: row.phone,
            status: row.status,
            total_price: row.total_price,
            user: UserRef {
                id: row.user_id,
                name: row.user_name,
            },
            date_ordered: row.date_ordered,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    item_id: OrderItemId,
    order_id: OrderId,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let sql = format!(
            "{ORDER_SELECT} GROUP BY o.id, u.name ORDER BY o.date_ordered DESC, o.id"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// Get an order with item ids only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_summary(&self, id: OrderId) -> Result<Option<OrderSummary>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1 GROUP BY o.id, u.name");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(OrderSummary::from))
    }

    /// Get an order with its items, products, and categories populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(summary) = self.get_summary(id).await? else {
            return Ok(None);
        };

        let mut details = self.populate(vec![summary]).await?;
        Ok(details.pop())
    }

    /// List one user's orders with items populated, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<OrderDetail>, RepositoryError> {
        let sql = format!(
            "{ORDER_SELECT} WHERE o.user_id = $1 GROUP BY o.id, u.name \
             ORDER BY o.date_ordered DESC, o.id"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user)
            .fetch_all(self.pool)
            .await?;

        self.populate(rows.into_iter().map(OrderSummary::from).collect())
            .await
    }

    /// Price and store a new order and its items in one transaction.
    ///
    /// Each line is priced from the product's current price; the total is
    /// the exact decimal sum of `quantity × price` over all lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if the user or any product
    /// doesn't exist, or if the total overflows.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let quantities = order
            .lines
            .iter()
            .map(|line| {
                i32::try_from(line.quantity).map_err(|_| {
                    RepositoryError::InvalidInput(format!(
                        "item quantity must be between 1 and {MAX_LINE_QUANTITY}"
                    ))
                })
            })
            .collect::<Result<Vec<i32>, _>>()?;

        let mut tx = self.pool.begin().await?;

        let (user_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM shop.user_account WHERE id = $1)")
                .bind(order.user)
                .fetch_one(&mut *tx)
                .await?;
        if !user_exists {
            return Err(RepositoryError::InvalidInput("Invalid user".to_owned()));
        }

        // Lock the priced rows so a product can't be deleted mid-order.
        let product_ids: Vec<Uuid> = order.lines.iter().map(|l| l.product.as_uuid()).collect();
        let prices: HashMap<ProductId, Decimal> = sqlx::query_as::<_, (ProductId, Decimal)>(
            "SELECT id, price FROM shop.product WHERE id = ANY($1) FOR SHARE",
        )
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let mut priced = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let unit_price = prices.get(&line.product).copied().ok_or_else(|| {
                RepositoryError::InvalidInput(format!("Invalid product {}", line.product))
            })?;
            priced.push((*line, LineItem::new(unit_price, line.quantity)));
        }

        let total = order_total(priced.iter().map(|(_, item)| *item))
            .and_then(validate_total)
            .map_err(|e| RepositoryError::InvalidInput(e.to_string()))?;

        let (order_id,): (OrderId,) = sqlx::query_as(
            r"
            INSERT INTO shop.customer_order (
                user_id, shipping_address1, shipping_address2, city, zip,
                country, phone, status, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(order.user)
        .bind(&order.shipping_address1)
        .bind(&order.shipping_address2)
        .bind(&order.city)
        .bind(&order.zip)
        .bind(&order.country)
        .bind(&order.phone)
        .bind(order.status)
        .bind(total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "order already exists", "Invalid user"))?;

        for (position, ((line, item), quantity)) in priced.iter().zip(&quantities).enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| RepositoryError::InvalidInput("too many order items".to_owned()))?;

            sqlx::query(
                r"
                INSERT INTO shop.order_item (order_id, product_id, position, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(line.product)
            .bind(position)
            .bind(*quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "order item already exists", "Invalid product")
            })?;
        }

        tx.commit().await?;

        tracing::debug!(
            order_id = %order_id,
            items = priced.len(),
            total = %total,
            "Order stored"
        );

        Ok(order_id)
    }

    /// Set an order's status.
    ///
    /// Returns `None` if the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<OrderSummary>, RepositoryError> {
        let result = sqlx::query("UPDATE shop.customer_order SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_summary(id).await
    }

    /// Delete an order; its items go with it.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.customer_order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.customer_order")
            .fetch_one(self.pool)
            .await?;

        Ok(to_count(count))
    }

    /// Sum of every order's total price; zero when there are no orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_sales(&self) -> Result<Decimal, RepositoryError> {
        let (total,): (Decimal,) =
            sqlx::query_as("SELECT COALESCE(SUM(total_price), 0) FROM shop.customer_order")
                .fetch_one(self.pool)
                .await?;

        Ok(total)
    }

    /// Replace item ids with populated items, preserving order and item order.
    async fn populate(
        &self,
        orders: Vec<OrderSummary>,
    ) -> Result<Vec<OrderDetail>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let sql = format!(
            r"
            SELECT oi.id AS item_id, oi.order_id, oi.quantity, {PRODUCT_COLUMNS}
            FROM shop.order_item oi
            JOIN shop.product p ON p.id = oi.product_id
            JOIN shop.category c ON c.id = p.category_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.position
            "
        );

        let rows = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(&order_ids)
            .fetch_all(self.pool)
            .await?;

        let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            items_by_order
                .entry(row.order_id)
                .or_default()
                .push(OrderItem {
                    id: row.item_id,
                    quantity: row.quantity,
                    product: row.product.into(),
                });
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                order.with_items(items)
            })
            .collect())
    }
}
