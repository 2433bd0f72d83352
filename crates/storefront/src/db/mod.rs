//! Database operations for the storefront `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` - Site accounts (argon2 password hashes, admin flag)
//! - `categories`, `products` - Catalog and stock counts
//! - `orders`, `order_items` - Placed orders and their lines
//! - `subscriptions` - Recurring delivery plans (schema only)
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Repositories
//!
//! Services talk to storage through the [`CatalogStore`], [`OrderStore`] and
//! [`UserStore`] traits. The `PostgreSQL` implementations borrow a pool:
//!
//! - [`CatalogRepository`]
//! - [`OrderRepository`]
//! - [`UserRepository`]
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cheez-cli -- migrate
//! ```

pub mod catalog;
pub mod orders;
pub mod users;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cheez_core::{CategoryId, OrderId, OrderStatus, ProductId, UserId, Username};

use crate::models::{
    Category, NewOrder, Order, OrderWithItems, Product, ProductWithCategory, StatusUpdate,
    StockPolicy, User,
};

pub use catalog::CatalogRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// An order line asked for more units than the product has.
    #[error("insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// A restock would push stock past the `INTEGER` range.
    #[error("stock limit reached for product {0}")]
    StockLimit(ProductId),
}

/// Read and restock access to the catalog.
pub trait CatalogStore: Send + Sync {
    /// Categories with `is_active = true`.
    fn active_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<Category>, RepositoryError>> + Send;

    /// Active products joined with their category, optionally limited to one category.
    fn active_products(
        &self,
        category: Option<CategoryId>,
    ) -> impl Future<Output = Result<Vec<ProductWithCategory>, RepositoryError>> + Send;

    /// Every product regardless of the active flag, ordered by name descending.
    fn all_products(&self) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Products whose ID is in `ids`. Missing IDs are simply absent from the result.
    fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Atomically add `quantity` units to a product's stock.
    ///
    /// Returns `None` if the product does not exist, and
    /// `RepositoryError::StockLimit` if the new stock would not fit in an `i32`.
    fn add_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;
}

/// Order placement and lookup.
pub trait OrderStore: Send + Sync {
    /// Write an order, its lines and the stock decrements as one unit.
    ///
    /// Nothing is written if any step fails.
    fn place_order(
        &self,
        order: &NewOrder,
        policy: StockPolicy,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Orders placed by `user`, newest first.
    fn orders_for_user(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<OrderWithItems>, RepositoryError>> + Send;

    /// Every order, newest first.
    fn all_orders(
        &self,
    ) -> impl Future<Output = Result<Vec<OrderWithItems>, RepositoryError>> + Send;

    /// One order with its lines.
    fn order_with_items(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<OrderWithItems>, RepositoryError>> + Send;

    /// Set the status of an order if its current status is in `allowed_from`.
    fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        allowed_from: &[OrderStatus],
    ) -> impl Future<Output = Result<StatusUpdate, RepositoryError>> + Send;
}

/// Account lookup and creation.
pub trait UserStore: Send + Sync {
    /// A user and their stored password hash.
    fn credentials_by_username(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;

    /// A user by ID.
    fn by_id(&self, id: UserId)
    -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Create a user from an already hashed password.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    fn create(
        &self,
        username: &Username,
        password_hash: &str,
        is_admin: bool,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique violation to `RepositoryError::Conflict`.
fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
