//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use cheez_core::{
    OrderId, OrderItemId, OrderStatus, PaymentMethod, PhoneNumber, ProductId, UserId,
};

use super::catalog::Product;

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Set when the order was placed with a logged-in session.
    pub user_id: Option<UserId>,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub instructions: Option<String>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Mobile wallet number for `JazzCash` / `EasyPaisa` payments.
    pub payment_phone: Option<String>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One line of an order. `subtotal` is fixed at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price at the time of the order.
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// An order line joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemWithProduct {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Product,
}

/// An order with all of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemWithProduct>,
}

/// A validated order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub name: String,
    pub phone: PhoneNumber,
    pub address: String,
    pub instructions: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_phone: Option<PhoneNumber>,
    pub lines: Vec<NewOrderLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// One requested line of a [`NewOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
    /// `price * quantity`, checked to fit in storage.
    pub subtotal: Decimal,
}

/// What to do when an order line asks for more units than are in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Roll the whole order back.
    #[default]
    Reject,
    /// Accept the order and floor stock at zero.
    Clamp,
}

impl std::str::FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            _ => Err(format!(
                "invalid stock policy: {s} (expected reject or clamp)"
            )),
        }
    }
}

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The status was written.
    Updated(Order),
    /// No order with that ID exists.
    NotFound,
    /// The order exists but its current status is not an allowed predecessor.
    Rejected(OrderStatus),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_policy_from_str() {
        assert_eq!("reject".parse::<StockPolicy>().unwrap(), StockPolicy::Reject);
        assert_eq!("clamp".parse::<StockPolicy>().unwrap(), StockPolicy::Clamp);
        assert!("floor".parse::<StockPolicy>().is_err());
        assert_eq!(StockPolicy::default(), StockPolicy::Reject);
    }

    #[test]
    fn test_order_serializes_wire_names() {
        let order = Order {
            id: OrderId::new(7),
            user_id: None,
            name: "Ayesha".to_owned(),
            phone: "0300-1234567".to_owned(),
            address: "House 1, Street 2".to_owned(),
            instructions: None,
            status: OrderStatus::OutForDelivery,
            payment_method: PaymentMethod::CashOnDelivery,
            payment_phone: None,
            subtotal: Decimal::new(16500, 2),
            delivery_fee: Decimal::new(5000, 2),
            total: Decimal::new(21500, 2),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(order).unwrap();
        assert_eq!(json["status"], "out_for_delivery");
        assert_eq!(json["paymentMethod"], "cash_on_delivery");
        assert_eq!(json["deliveryFee"], "50.00");
        assert!(json["userId"].is_null());
    }
}
