//! Catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cheez_core::{CategoryId, ProductId};

/// A product category shown as a filter pill in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub emoji: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in rupees.
    pub price: Decimal,
    pub image_url: String,
    /// Units on hand. Never negative.
    pub stock: i32,
    /// Optional badge text ("New", "Bestseller").
    pub tag: Option<String>,
    pub is_active: bool,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
}

/// A product joined with its category, as returned by the shop listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub emoji: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Input for creating a product. The category is resolved by the caller.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub stock: i32,
    pub tag: Option<String>,
    pub is_active: bool,
    pub category_id: CategoryId,
}

const fn default_true() -> bool {
    true
}
