//! Order repository.
//!
//! Placement writes the order, its lines and the stock decrements inside one
//! transaction. Dropping the transaction on any early return rolls back.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cheez_core::{OrderId, OrderItemId, OrderStatus, PaymentMethod, UserId};

use super::catalog::ProductRow;
use super::{OrderStore, RepositoryError};
use crate::models::{
    NewOrder, Order, OrderItem, OrderItemWithProduct, OrderWithItems, Product, StatusUpdate,
    StockPolicy,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    name: String,
    phone: String,
    address: String,
    instructions: Option<String>,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_phone: Option<String>,
    subtotal: Decimal,
    delivery_fee: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            name: row.name,
            phone: row.phone,
            address: row.address,
            instructions: row.instructions,
            status: row.status,
            payment_method: row.payment_method,
            payment_phone: row.payment_phone,
            subtotal: row.subtotal,
            delivery_fee: row.delivery_fee,
            total: row.total,
            created_at: row.created_at,
        }
    }
}

/// Order line columns (prefixed `item_`) plus the full product row.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    item_id: i32,
    order_id: i32,
    quantity: i32,
    item_price: Decimal,
    item_subtotal: Decimal,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl From<OrderItemRow> for OrderItemWithProduct {
    fn from(row: OrderItemRow) -> Self {
        let product: Product = row.product.into();
        Self {
            item: OrderItem {
                id: OrderItemId::new(row.item_id),
                order_id: OrderId::new(row.order_id),
                product_id: product.id,
                quantity: row.quantity,
                price: row.item_price,
                subtotal: row.item_subtotal,
            },
            product,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Clone, Copy)]
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the lines for a set of orders and attach them.
    async fn attach_items(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id AS item_id, oi.order_id, oi.quantity,
                   oi.price AS item_price, oi.subtotal AS item_subtotal,
                   p.id, p.name, p.description, p.price, p.image_url, p.stock, p.tag,
                   p.is_active, p.category_id, p.created_at
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItemWithProduct>> = HashMap::new();
        for row in rows {
            let item = OrderItemWithProduct::from(row);
            by_order.entry(item.item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn place_order(
        &self,
        order: &NewOrder,
        policy: StockPolicy,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders
                (user_id, name, phone, address, instructions, status,
                 payment_method, payment_phone, subtotal, delivery_fee, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, name, phone, address, instructions, status,
                      payment_method, payment_phone, subtotal, delivery_fee, total, created_at
            ",
        )
        .bind(order.user_id)
        .bind(&order.name)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(order.instructions.as_deref())
        .bind(OrderStatus::Pending)
        .bind(order.payment_method)
        .bind(order.payment_phone.as_ref())
        .bind(order.subtotal)
        .bind(order.delivery_fee)
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(row.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .bind(line.subtotal)
            .execute(&mut *tx)
            .await
            .map_err(unknown_product)?;
        }

        for line in &order.lines {
            let statement = match policy {
                StockPolicy::Reject => {
                    r"
                    UPDATE products
                    SET stock = stock - $2
                    WHERE id = $1 AND stock >= $2
                    "
                }
                StockPolicy::Clamp => {
                    r"
                    UPDATE products
                    SET stock = GREATEST(stock - $2, 0)
                    WHERE id = $1
                    "
                }
            };

            let updated = sqlx::query(statement)
                .bind(line.product_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            if updated == 0 {
                return Err(RepositoryError::InsufficientStock(line.product_id));
            }
        }

        tx.commit().await?;

        Ok(row.into())
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, name, phone, address, instructions, status,
                   payment_method, payment_phone, subtotal, delivery_fee, total, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows.into_iter().map(Into::into).collect())
            .await
    }

    async fn all_orders(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, name, phone, address, instructions, status,
                   payment_method, payment_phone, subtotal, delivery_fee, total, created_at
            FROM orders
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows.into_iter().map(Into::into).collect())
            .await
    }

    async fn order_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, name, phone, address, instructions, status,
                   payment_method, payment_phone, subtotal, delivery_fee, total, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.attach_items(vec![row.into()]).await?.pop())
    }

    async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        allowed_from: &[OrderStatus],
    ) -> Result<StatusUpdate, RepositoryError> {
        let allowed: Vec<&str> = allowed_from.iter().map(|s| s.as_str()).collect();

        let updated = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders
            SET status = $2
            WHERE id = $1 AND status = ANY($3)
            RETURNING id, user_id, name, phone, address, instructions, status,
                      payment_method, payment_phone, subtotal, delivery_fee, total, created_at
            ",
        )
        .bind(id)
        .bind(status)
        .bind(allowed)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(StatusUpdate::Updated(row.into()));
        }

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(current.map_or(StatusUpdate::NotFound, StatusUpdate::Rejected))
    }
}

/// An order line pointing at a product that does not exist.
fn unknown_product(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(e)
}
