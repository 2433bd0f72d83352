//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. Everything that crosses the HTTP boundary serializes
//! with camelCase field names.

pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use catalog::{Category, NewCategory, NewProduct, Product, ProductWithCategory};
pub use order::{
    NewOrder, NewOrderLine, Order, OrderItem, OrderItemWithProduct, OrderWithItems, StatusUpdate,
    StockPolicy,
};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserSummary};
