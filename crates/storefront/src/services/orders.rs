//! Order service: checkout, listings and status updates.
//!
//! # Placement
//!
//! 1. The request is validated into a [`NewOrder`] (contact fields, phone
//!    format, payment phone for wallets, positive quantities, amounts between
//!    zero and [`MAX_AMOUNT`](cheez_core::MAX_AMOUNT)).
//! 2. When a totals tolerance is configured, each line is checked against the
//!    catalog and the submitted subtotal and total are recomputed. Submitted
//!    amounts are still what gets stored.
//! 3. The order, its lines and the stock decrements are written in one
//!    transaction by [`OrderStore::place_order`].

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Deserialize;

use cheez_core::{
    OrderId, OrderStatus, PaymentMethod, PhoneNumber, ProductId, is_storable_amount,
    line_subtotal, within_tolerance,
};

use super::{ServiceError, require_admin};
use crate::config::OrderSettings;
use crate::db::{CatalogStore, OrderStore, RepositoryError};
use crate::models::{CurrentUser, NewOrder, NewOrderLine, Order, OrderWithItems, StatusUpdate};

/// Checkout payload as sent by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_phone: Option<String>,
    pub items: Vec<OrderLineRequest>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// One cart line in a [`PlaceOrderRequest`].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Order placement and management.
pub struct OrderService<O, C> {
    orders: O,
    catalog: C,
    settings: OrderSettings,
}

impl<O: OrderStore, C: CatalogStore> OrderService<O, C> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(orders: O, catalog: C, settings: OrderSettings) -> Self {
        Self {
            orders,
            catalog,
            settings,
        }
    }

    /// Place an order, attaching it to `user` when one is logged in.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` for malformed input or totals that do
    /// not match the catalog, and `ServiceError::InsufficientStock` when the
    /// stock policy rejects a line.
    pub async fn place_order(
        &self,
        user: Option<&CurrentUser>,
        request: PlaceOrderRequest,
    ) -> Result<Order, ServiceError> {
        let order = validate(request, user)?;

        if let Some(tolerance) = self.settings.totals_tolerance {
            self.verify_totals(&order, tolerance).await?;
        }

        let placed = self
            .orders
            .place_order(&order, self.settings.stock_policy)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => {
                    ServiceError::invalid("order references an unknown product")
                }
                other => other.into(),
            })?;

        tracing::info!(
            order_id = %placed.id,
            user_id = ?placed.user_id.map(|id| id.as_i32()),
            lines = order.lines.len(),
            total = %placed.total,
            payment_method = %placed.payment_method,
            "order placed"
        );

        Ok(placed)
    }

    /// Orders placed by the logged-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn orders_for(&self, user: &CurrentUser) -> Result<Vec<OrderWithItems>, ServiceError> {
        Ok(self.orders.orders_for_user(user.id).await?)
    }

    /// Every order, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admin callers.
    pub async fn all_orders(&self, user: &CurrentUser) -> Result<Vec<OrderWithItems>, ServiceError> {
        require_admin(user)?;
        Ok(self.orders.all_orders().await?)
    }

    /// One order. Visible to its owner and to admins.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order does not exist or
    /// belongs to someone else.
    pub async fn order(
        &self,
        user: &CurrentUser,
        id: OrderId,
    ) -> Result<OrderWithItems, ServiceError> {
        let order = self
            .orders
            .order_with_items(id)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;

        if !user.is_admin && order.order.user_id != Some(user.id) {
            return Err(ServiceError::NotFound("order"));
        }

        Ok(order)
    }

    /// Set an order's status. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admin callers,
    /// `ServiceError::Invalid` for an unknown status or a move the configured
    /// transition policy does not allow, and `ServiceError::NotFound` if the
    /// order does not exist.
    pub async fn update_status(
        &self,
        user: &CurrentUser,
        id: OrderId,
        status: &str,
    ) -> Result<Order, ServiceError> {
        require_admin(user)?;

        let status: OrderStatus = status
            .parse()
            .map_err(|_| ServiceError::invalid("Invalid status"))?;

        let allowed = status.allowed_predecessors(self.settings.transitions);

        match self.orders.set_status(id, status, allowed).await? {
            StatusUpdate::Updated(order) => {
                tracing::info!(
                    order_id = %id,
                    status = %status,
                    admin = %user.username,
                    "order status updated"
                );
                Ok(order)
            }
            StatusUpdate::NotFound => Err(ServiceError::NotFound("order")),
            StatusUpdate::Rejected(current) => {
                tracing::warn!(
                    order_id = %id,
                    from = %current,
                    to = %status,
                    "status transition rejected"
                );
                Err(ServiceError::Invalid(format!(
                    "cannot move order from {current} to {status}"
                )))
            }
        }
    }

    /// Check submitted prices and totals against the catalog.
    async fn verify_totals(&self, order: &NewOrder, tolerance: Decimal) -> Result<(), ServiceError> {
        let ids: Vec<ProductId> = order
            .lines
            .iter()
            .map(|line| line.product_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let catalog: HashMap<ProductId, Decimal> = self
            .catalog
            .products_by_ids(&ids)
            .await?
            .into_iter()
            .filter(|product| product.is_active)
            .map(|product| (product.id, product.price))
            .collect();

        let mut computed = Decimal::ZERO;
        for line in &order.lines {
            let Some(&price) = catalog.get(&line.product_id) else {
                return Err(ServiceError::Invalid(format!(
                    "product {} is not available",
                    line.product_id
                )));
            };
            if !within_tolerance(line.price, price, tolerance) {
                return Err(ServiceError::Invalid(format!(
                    "price for product {} does not match the catalog",
                    line.product_id
                )));
            }
            computed = line_subtotal(price, line.quantity)
                .and_then(|subtotal| computed.checked_add(subtotal))
                .ok_or_else(|| ServiceError::invalid("subtotal does not match the items"))?;
        }

        if !within_tolerance(order.subtotal, computed, tolerance) {
            return Err(ServiceError::invalid("subtotal does not match the items"));
        }

        let total_matches = order
            .subtotal
            .checked_add(order.delivery_fee)
            .is_some_and(|expected| within_tolerance(order.total, expected, tolerance));
        if !total_matches {
            return Err(ServiceError::invalid(
                "total does not match subtotal plus delivery fee",
            ));
        }

        Ok(())
    }
}

/// Turn a checkout payload into a [`NewOrder`].
///
/// # Errors
///
/// Returns `ServiceError::Invalid` describing the first problem found.
pub fn validate(
    request: PlaceOrderRequest,
    user: Option<&CurrentUser>,
) -> Result<NewOrder, ServiceError> {
    let name = required(request.name, "name")?;
    let address = required(request.address, "address")?;

    let phone = PhoneNumber::parse(&request.phone)
        .map_err(|e| ServiceError::Invalid(format!("phone: {e}")))?;

    let payment_phone = request
        .payment_phone
        .filter(|p| !p.trim().is_empty())
        .map(|p| PhoneNumber::parse(&p))
        .transpose()
        .map_err(|e| ServiceError::Invalid(format!("paymentPhone: {e}")))?;

    if request.payment_method.is_mobile_wallet() && payment_phone.is_none() {
        return Err(ServiceError::Invalid(format!(
            "paymentPhone is required for {} payments",
            request.payment_method
        )));
    }

    if request.items.is_empty() {
        return Err(ServiceError::invalid("order must contain at least one item"));
    }

    let mut lines = Vec::with_capacity(request.items.len());
    for item in request.items {
        if item.quantity < 1 {
            return Err(ServiceError::Invalid(format!(
                "quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        let price_field = format!("price for product {}", item.product_id);
        check_amount(&price_field, item.price)?;
        let subtotal = line_subtotal(item.price, item.quantity)
            .filter(|subtotal| is_storable_amount(*subtotal))
            .ok_or_else(|| {
                ServiceError::Invalid(format!(
                    "line total for product {} exceeds the maximum amount",
                    item.product_id
                ))
            })?;
        lines.push(NewOrderLine {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            subtotal,
        });
    }

    check_amount("subtotal", request.subtotal)?;
    check_amount("deliveryFee", request.delivery_fee)?;
    check_amount("total", request.total)?;

    let instructions = request
        .instructions
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());

    Ok(NewOrder {
        user_id: user.map(|u| u.id),
        name,
        phone,
        address,
        instructions,
        payment_method: request.payment_method,
        payment_phone,
        lines,
        subtotal: request.subtotal,
        delivery_fee: request.delivery_fee,
        total: request.total,
    })
}

/// Non-negative amount that fits in a `NUMERIC(10, 2)` column.
fn check_amount(field: &str, amount: Decimal) -> Result<(), ServiceError> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::Invalid(format!("{field} cannot be negative")));
    }
    if !is_storable_amount(amount) {
        return Err(ServiceError::Invalid(format!("{field} exceeds the maximum amount")));
    }
    Ok(())
}

/// Trimmed, non-empty text field.
fn required(value: String, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Invalid(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cheez_core::{MAX_AMOUNT, UserId};

    fn request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            name: " Ayesha Khan ".to_owned(),
            phone: "0300-1234567".to_owned(),
            address: "House 12, Street 4, F-7".to_owned(),
            instructions: Some("   ".to_owned()),
            payment_method: PaymentMethod::CashOnDelivery,
            payment_phone: None,
            items: vec![
                OrderLineRequest {
                    product_id: ProductId::new(1),
                    quantity: 2,
                    price: Decimal::new(45, 0),
                },
                OrderLineRequest {
                    product_id: ProductId::new(2),
                    quantity: 1,
                    price: Decimal::new(75, 0),
                },
            ],
            subtotal: Decimal::new(165, 0),
            delivery_fee: Decimal::new(50, 0),
            total: Decimal::new(215, 0),
        }
    }

    fn invalid_message(result: Result<NewOrder, ServiceError>) -> String {
        match result {
            Err(ServiceError::Invalid(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_trims_and_drops_blank_instructions() {
        let order = validate(request(), None).unwrap();
        assert_eq!(order.name, "Ayesha Khan");
        assert_eq!(order.instructions, None);
        assert_eq!(order.user_id, None);
        assert_eq!(order.lines.len(), 2);
    }

    #[test]
    fn test_validate_attaches_logged_in_user() {
        let user = CurrentUser {
            id: UserId::new(9),
            username: "user".to_owned(),
            is_admin: false,
        };
        let order = validate(request(), Some(&user)).unwrap();
        assert_eq!(order.user_id, Some(UserId::new(9)));
    }

    #[test]
    fn test_validate_requires_name_and_address() {
        let mut req = request();
        req.name = "  ".to_owned();
        assert_eq!(invalid_message(validate(req, None)), "name is required");

        let mut req = request();
        req.address = String::new();
        assert_eq!(invalid_message(validate(req, None)), "address is required");
    }

    #[test]
    fn test_validate_rejects_bad_phone() {
        let mut req = request();
        req.phone = "12345".to_owned();
        assert!(invalid_message(validate(req, None)).starts_with("phone:"));
    }

    #[test]
    fn test_validate_wallet_needs_payment_phone() {
        let mut req = request();
        req.payment_method = PaymentMethod::Jazzcash;
        assert_eq!(
            invalid_message(validate(req.clone(), None)),
            "paymentPhone is required for jazzcash payments"
        );

        req.payment_phone = Some("0345-7654321".to_owned());
        let order = validate(req, None).unwrap();
        assert_eq!(order.payment_phone.unwrap().as_str(), "0345-7654321");
    }

    #[test]
    fn test_validate_rejects_empty_cart_and_zero_quantity() {
        let mut req = request();
        req.items.clear();
        assert_eq!(
            invalid_message(validate(req, None)),
            "order must contain at least one item"
        );

        let mut req = request();
        req.items[0].quantity = 0;
        assert_eq!(
            invalid_message(validate(req, None)),
            "quantity for product 1 must be at least 1"
        );
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        let mut req = request();
        req.delivery_fee = Decimal::new(-1, 0);
        assert_eq!(
            invalid_message(validate(req, None)),
            "deliveryFee cannot be negative"
        );

        let mut req = request();
        req.items[1].price = Decimal::new(-75, 0);
        assert_eq!(
            invalid_message(validate(req, None)),
            "price for product 2 cannot be negative"
        );
    }

    #[test]
    fn test_validate_rejects_amounts_too_large_to_store() {
        let mut req = request();
        req.delivery_fee = Decimal::MAX;
        req.total = Decimal::MAX;
        assert_eq!(
            invalid_message(validate(req, None)),
            "deliveryFee exceeds the maximum amount"
        );

        let mut req = request();
        req.items[0].price = Decimal::MAX;
        assert_eq!(
            invalid_message(validate(req, None)),
            "price for product 1 exceeds the maximum amount"
        );

        let mut req = request();
        req.subtotal = MAX_AMOUNT + Decimal::new(1, 2);
        assert_eq!(
            invalid_message(validate(req, None)),
            "subtotal exceeds the maximum amount"
        );
    }

    #[test]
    fn test_validate_rejects_line_total_too_large_to_store() {
        let mut req = request();
        req.items[0].price = MAX_AMOUNT;
        req.items[0].quantity = i32::MAX;
        assert_eq!(
            invalid_message(validate(req, None)),
            "line total for product 1 exceeds the maximum amount"
        );
    }

    #[test]
    fn test_validate_computes_line_subtotals() {
        let order = validate(request(), None).unwrap();
        assert_eq!(order.lines[0].subtotal, Decimal::new(90, 0));
        assert_eq!(order.lines[1].subtotal, Decimal::new(75, 0));
    }
}
