//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{OrderId, OrderItemId, OrderStatus, UserId};

use super::Product;

/// The ordering user, reduced to what order listings show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

/// One order line with its product populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: i32,
    pub product: Product,
}

/// An order, generic over how its items are represented.
///
/// Listings carry bare item ids ([`OrderSummary`]); detail views carry
/// fully populated items ([`OrderDetail`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order<I> {
    pub id: OrderId,
    pub order_items: Vec<I>,
    pub shipping_address1: String,
    pub shipping_address2: Option<String>,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub user: UserRef,
    pub date_ordered: DateTime<Utc>,
}

/// Order with item ids only.
pub type OrderSummary = Order<OrderItemId>;

/// Order with items, their products, and those products' categories.
pub type OrderDetail = Order<OrderItem>;

impl<I> Order<I> {
    /// Swap the item representation, keeping every other field.
    pub fn with_items<J>(self, order_items: Vec<J>) -> Order<J> {
        Order {
            id: self.id,
            order_items,
            shipping_address1: self.shipping_address1,
            shipping_address2: self.shipping_address2,
            city: self.city,
            zip: self.zip,
            country: self.country,
            phone: self.phone,
            status: self.status,
            total_price: self.total_price,
            user: self.user,
            date_ordered: self.date_ordered,
        }
    }
}
