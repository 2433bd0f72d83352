//! Catalog service.

use cheez_core::{CategoryId, ProductId};

use super::{ServiceError, require_admin};
use crate::db::CatalogStore;
use crate::models::{Category, CurrentUser, Product, ProductWithCategory};

/// Catalog listings and inventory adjustment.
pub struct CatalogService<C> {
    store: C,
}

impl<C: CatalogStore> CatalogService<C> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: C) -> Self {
        Self { store }
    }

    /// Active categories.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.store.active_categories().await?)
    }

    /// Active products, optionally limited to one category.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn products(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<ProductWithCategory>, ServiceError> {
        Ok(self.store.active_products(category).await?)
    }

    /// Every product, including inactive ones. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admin callers.
    pub async fn inventory(&self, user: &CurrentUser) -> Result<Vec<Product>, ServiceError> {
        require_admin(user)?;
        Ok(self.store.all_products().await?)
    }

    /// Add units to a product's stock. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admin callers,
    /// `ServiceError::Invalid` if `quantity` is below one or would push stock
    /// past `i32::MAX`, and `ServiceError::NotFound` if the product does not
    /// exist.
    pub async fn add_stock(
        &self,
        user: &CurrentUser,
        id: ProductId,
        quantity: i32,
    ) -> Result<Product, ServiceError> {
        require_admin(user)?;

        if quantity < 1 {
            return Err(ServiceError::invalid("Invalid quantity"));
        }

        let product = self
            .store
            .add_stock(id, quantity)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;

        tracing::info!(
            product_id = %id,
            quantity,
            stock = product.stock,
            admin = %user.username,
            "stock adjusted"
        );

        Ok(product)
    }
}
