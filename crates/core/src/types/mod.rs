//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{
    LineItem, MAX_ORDER_TOTAL, MAX_PRICE, MONEY_SCALE, MoneyError, order_total, validate_price,
    validate_total,
};
pub use status::{OrderStatus, OrderStatusError};
