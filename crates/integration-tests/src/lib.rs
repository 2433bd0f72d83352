//! Integration tests for the Cheez storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Service and router tests (no database needed)
//! cargo test -p cheez-integration-tests
//!
//! # Live-server tests (needs a migrated, seeded database and a running server)
//! cargo test -p cheez-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `orders`, `order_status`, `inventory`, `catalog`, `auth` - service
//!   behavior against [`MemoryStore`]
//! - `router` - middleware, guards and error mapping via `oneshot`
//! - `http_api` - end-to-end against a running server
//!
//! [`MemoryStore`] implements the storefront repository traits on top of a
//! `tokio::sync::RwLock`, with the same all-or-nothing order placement as the
//! `PostgreSQL` repositories.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use cheez_core::{
    CategoryId, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, UserId, Username,
};
use cheez_storefront::config::OrderSettings;
use cheez_storefront::db::{CatalogStore, OrderStore, RepositoryError, UserStore};
use cheez_storefront::models::{
    Category, CurrentUser, NewOrder, Order, OrderItem, OrderItemWithProduct, OrderWithItems,
    Product, ProductWithCategory, StatusUpdate, StockPolicy, User,
};
use cheez_storefront::services::{
    AuthService, CatalogService, OrderLineRequest, OrderService, PlaceOrderRequest, hash_password,
};

/// Password of the fixture admin account.
pub const ADMIN_PASSWORD: &str = "admin123";
/// Password of the fixture customer account.
pub const CUSTOMER_PASSWORD: &str = "password";

#[derive(Debug, Default, Clone)]
struct Data {
    categories: Vec<Category>,
    products: Vec<Product>,
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    users: Vec<(User, String)>,
    next_order_id: i32,
    next_item_id: i32,
}

impl Data {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn with_items(&self, order: &Order) -> OrderWithItems {
        let items = self
            .items
            .iter()
            .filter(|item| item.order_id == order.id)
            .filter_map(|item| {
                self.product(item.product_id).map(|product| OrderItemWithProduct {
                    item: item.clone(),
                    product: product.clone(),
                })
            })
            .collect();

        OrderWithItems {
            order: order.clone(),
            items,
        }
    }

    /// Orders matching `filter`, newest first.
    fn listing(&self, filter: impl Fn(&Order) -> bool) -> Vec<OrderWithItems> {
        let mut orders: Vec<&Order> = self.orders.iter().filter(|o| filter(o)).collect();
        orders.sort_by(|a, b| (b.created_at, b.id.as_i32()).cmp(&(a.created_at, a.id.as_i32())));
        orders.into_iter().map(|o| self.with_items(o)).collect()
    }
}

/// In-memory implementation of the storefront repository traits.
///
/// Clones share the same data, so one store can back several services.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Data>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the standard fixture catalog and both accounts.
    ///
    /// | id | product                   | price | stock | category | active |
    /// |----|---------------------------|-------|-------|----------|--------|
    /// | 1  | Masala Crunch Chips       | 45    | 50    | 1        | yes    |
    /// | 2  | Chocolatey Biscuit Sticks | 75    | 40    | 1        | yes    |
    /// | 3  | Fruit Munch Mix           | 95    | 25    | 2        | yes    |
    /// | 4  | Sugar Rush Candy          | 30    | 10    | 2        | no     |
    ///
    /// Category 3 ("Seasonal") is inactive. Users: 1 `admin` (admin),
    /// 2 `user`.
    #[must_use]
    pub fn seeded() -> Self {
        let now = Utc::now();
        let category = |id: i32, name: &str, emoji: &str, is_active: bool| Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
            emoji: emoji.to_owned(),
            description: None,
            is_active,
        };
        let product = |id: i32, name: &str, price: i64, stock: i32, category: i32, active: bool| {
            Product {
                id: ProductId::new(id),
                name: name.to_owned(),
                description: format!("{name} description"),
                price: Decimal::new(price, 0),
                image_url: format!("https://img.example.com/{id}.jpg"),
                stock,
                tag: None,
                is_active: active,
                category_id: CategoryId::new(category),
                created_at: now,
            }
        };
        let (admin_hash, customer_hash) = fixture_hashes();

        let data = Data {
            categories: vec![
                category(1, "After-School Snacks", "🎒", true),
                category(2, "Healthy Munchies", "🍎", true),
                category(3, "Seasonal", "🎃", false),
            ],
            products: vec![
                product(1, "Masala Crunch Chips", 45, 50, 1, true),
                product(2, "Chocolatey Biscuit Sticks", 75, 40, 1, true),
                product(3, "Fruit Munch Mix", 95, 25, 2, true),
                product(4, "Sugar Rush Candy", 30, 10, 2, false),
            ],
            users: vec![
                (user(1, "admin", true), admin_hash.clone()),
                (user(2, "user", false), customer_hash.clone()),
            ],
            ..Data::default()
        };

        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Current state of one product.
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.data.read().await.product(id).cloned()
    }

    /// Stock of one product, or `None` if it does not exist.
    pub async fn stock(&self, id: ProductId) -> Option<i32> {
        self.product(id).await.map(|p| p.stock)
    }

    /// Number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.data.read().await.orders.len()
    }

    /// Number of stored order lines.
    pub async fn item_count(&self) -> usize {
        self.data.read().await.items.len()
    }

    /// Remove a user, as an operator deleting an account would.
    pub async fn delete_user(&self, id: UserId) {
        self.data.write().await.users.retain(|(u, _)| u.id != id);
    }

    /// Change a user's admin flag.
    pub async fn set_admin(&self, id: UserId, is_admin: bool) {
        let mut data = self.data.write().await;
        if let Some((user, _)) = data.users.iter_mut().find(|(u, _)| u.id == id) {
            user.is_admin = is_admin;
        }
    }
}

impl CatalogStore for MemoryStore {
    async fn active_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let data = self.data.read().await;
        let mut categories: Vec<Category> = data
            .categories
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.id.as_i32());
        Ok(categories)
    }

    async fn active_products(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let data = self.data.read().await;
        let mut products: Vec<ProductWithCategory> = data
            .products
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| category.is_none_or(|id| p.category_id == id))
            .filter_map(|p| {
                data.categories
                    .iter()
                    .find(|c| c.id == p.category_id)
                    .map(|c| ProductWithCategory {
                        product: p.clone(),
                        category: c.clone(),
                    })
            })
            .collect();
        products.sort_by_key(|p| p.product.id.as_i32());
        Ok(products)
    }

    async fn all_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products = self.data.read().await.products.clone();
        products.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(products)
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn add_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut data = self.data.write().await;
        let Some(product) = data.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.stock = product
            .stock
            .checked_add(quantity)
            .ok_or(RepositoryError::StockLimit(id))?;
        Ok(Some(product.clone()))
    }
}

impl OrderStore for MemoryStore {
    async fn place_order(
        &self,
        order: &NewOrder,
        policy: StockPolicy,
    ) -> Result<Order, RepositoryError> {
        let mut data = self.data.write().await;

        // Work on a copy so a failed line leaves everything untouched.
        let mut staged = data.clone();

        staged.next_order_id += 1;
        let placed = Order {
            id: OrderId::new(staged.next_order_id),
            user_id: order.user_id,
            name: order.name.clone(),
            phone: order.phone.as_str().to_owned(),
            address: order.address.clone(),
            instructions: order.instructions.clone(),
            status: OrderStatus::Pending,
            payment_method: order.payment_method,
            payment_phone: order.payment_phone.as_ref().map(|p| p.as_str().to_owned()),
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total: order.total,
            created_at: Utc::now(),
        };

        for line in &order.lines {
            let product = staged
                .products
                .iter_mut()
                .find(|p| p.id == line.product_id)
                .ok_or(RepositoryError::NotFound)?;

            product.stock = match policy {
                StockPolicy::Reject if product.stock < line.quantity => {
                    return Err(RepositoryError::InsufficientStock(product.id));
                }
                StockPolicy::Reject => product.stock - line.quantity,
                StockPolicy::Clamp => (product.stock - line.quantity).max(0),
            };

            staged.next_item_id += 1;
            staged.items.push(OrderItem {
                id: OrderItemId::new(staged.next_item_id),
                order_id: placed.id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
                subtotal: line.subtotal,
            });
        }

        staged.orders.push(placed.clone());
        *data = staged;
        Ok(placed)
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<OrderWithItems>, RepositoryError> {
        Ok(self
            .data
            .read()
            .await
            .listing(|o| o.user_id == Some(user)))
    }

    async fn all_orders(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        Ok(self.data.read().await.listing(|_| true))
    }

    async fn order_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| data.with_items(o)))
    }

    async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        allowed_from: &[OrderStatus],
    ) -> Result<StatusUpdate, RepositoryError> {
        let mut data = self.data.write().await;
        let Some(order) = data.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(StatusUpdate::NotFound);
        };

        if !allowed_from.contains(&order.status) {
            return Ok(StatusUpdate::Rejected(order.status));
        }

        order.status = status;
        Ok(StatusUpdate::Updated(order.clone()))
    }
}

impl UserStore for MemoryStore {
    async fn credentials_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|(u, _)| u.username == *username)
            .cloned())
    }

    async fn by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|(u, _)| u.username == *username) {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }

        let next_id = data
            .users
            .iter()
            .map(|(u, _)| u.id.as_i32())
            .max()
            .unwrap_or(0)
            + 1;
        let user = User {
            id: UserId::new(next_id),
            username: username.clone(),
            is_admin,
            created_at: Utc::now(),
        };
        data.users.push((user.clone(), password_hash.to_owned()));
        Ok(user)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Argon2 hashes of the fixture passwords, computed once per test binary.
fn fixture_hashes() -> &'static (String, String) {
    static HASHES: OnceLock<(String, String)> = OnceLock::new();
    HASHES.get_or_init(|| {
        (
            hash_password(ADMIN_PASSWORD).unwrap_or_else(|e| panic!("fixture hash: {e}")),
            hash_password(CUSTOMER_PASSWORD).unwrap_or_else(|e| panic!("fixture hash: {e}")),
        )
    })
}

fn user(id: i32, username: &str, is_admin: bool) -> User {
    User {
        id: UserId::new(id),
        username: Username::parse(username).unwrap_or_else(|e| panic!("fixture username: {e}")),
        is_admin,
        created_at: Utc::now(),
    }
}

/// Session identity of the fixture admin.
#[must_use]
pub fn admin() -> CurrentUser {
    CurrentUser {
        id: UserId::new(1),
        username: "admin".to_owned(),
        is_admin: true,
    }
}

/// Session identity of the fixture customer.
#[must_use]
pub fn customer() -> CurrentUser {
    CurrentUser {
        id: UserId::new(2),
        username: "user".to_owned(),
        is_admin: false,
    }
}

/// Catalog service over `store`.
#[must_use]
pub fn catalog_service(store: &MemoryStore) -> CatalogService<MemoryStore> {
    CatalogService::new(store.clone())
}

/// Order service over `store` with the given rules.
#[must_use]
pub fn order_service(
    store: &MemoryStore,
    settings: OrderSettings,
) -> OrderService<MemoryStore, MemoryStore> {
    OrderService::new(store.clone(), store.clone(), settings)
}

/// Auth service over `store`.
#[must_use]
pub fn auth_service(store: &MemoryStore) -> AuthService<MemoryStore> {
    AuthService::new(store.clone())
}

/// A cash-on-delivery checkout for `lines` of `(product, quantity, unit price)`.
///
/// Subtotal is the sum of the lines, delivery fee 50, total their sum.
#[must_use]
pub fn checkout(lines: &[(i32, i32, i64)]) -> PlaceOrderRequest {
    let items: Vec<OrderLineRequest> = lines
        .iter()
        .map(|&(product, quantity, price)| OrderLineRequest {
            product_id: ProductId::new(product),
            quantity,
            price: Decimal::new(price, 0),
        })
        .collect();
    let subtotal: Decimal = items
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum();
    let delivery_fee = Decimal::new(50, 0);

    PlaceOrderRequest {
        name: "Ayesha Khan".to_owned(),
        phone: "0300-1234567".to_owned(),
        address: "House 12, Street 4, Gulberg, Lahore".to_owned(),
        instructions: None,
        payment_method: PaymentMethod::CashOnDelivery,
        payment_phone: None,
        items,
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
    }
}
