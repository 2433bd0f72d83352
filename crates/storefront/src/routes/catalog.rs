//! Catalog and inventory route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;

use cheez_core::{CategoryId, ProductId};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, Product, ProductWithCategory};
use crate::state::AppState;

/// Query string for the product listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    #[serde(default)]
    pub category_id: Option<String>,
}

impl ProductsQuery {
    /// The category filter. An empty value means no filter.
    fn category(&self) -> Result<Option<CategoryId>> {
        match self.category_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .map(|id| Some(CategoryId::new(id)))
                .map_err(|_| AppError::BadRequest("Invalid categoryId".to_owned())),
        }
    }
}

/// Inventory adjustment body.
#[derive(Debug, Deserialize)]
pub struct AdjustInventoryRequest {
    pub quantity: i32,
}

/// `GET /api/categories`
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories().await?))
}

/// `GET /api/products?categoryId=`
pub async fn products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductsQuery>,
) -> Result<Json<Vec<ProductWithCategory>>> {
    let category = query.category()?;
    Ok(Json(state.catalog().products(category).await?))
}

/// `GET /api/products/inventory`
pub async fn inventory(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().inventory(&user).await?))
}

/// `PATCH /api/products/{id}/inventory`
pub async fn adjust_inventory(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<AdjustInventoryRequest>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .add_stock(&user, id, body.quantity)
        .await?;
    Ok(Json(product))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(raw: Option<&str>) -> ProductsQuery {
        ProductsQuery {
            category_id: raw.map(str::to_owned),
        }
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!(query(None).category().unwrap(), None);
        assert_eq!(query(Some("")).category().unwrap(), None);
        assert_eq!(query(Some("3")).category().unwrap(), Some(CategoryId::new(3)));
        assert_eq!(query(Some("0")).category().unwrap(), Some(CategoryId::new(0)));
        assert!(query(Some("snacks")).category().is_err());
    }
}
