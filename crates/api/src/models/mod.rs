//! Domain models returned by the API.
//!
//! These are the JSON shapes clients see: camelCase field names, `id` for
//! the identifier, references to other entities populated inline where the
//! endpoint calls for it. Row types that mirror table columns live next to
//! their queries in [`crate::db`].

pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::Category;
pub use order::{Order, OrderDetail, OrderItem, OrderSummary, UserRef};
pub use product::Product;
pub use user::User;
