//! Catalog repository for categories, products and stock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cheez_core::{CategoryId, ProductId};

use super::{CatalogStore, RepositoryError, conflict_on_unique};
use crate::models::{Category, NewCategory, NewProduct, Product, ProductWithCategory};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    emoji: String,
    description: Option<String>,
    is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            emoji: row.emoji,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    stock: i32,
    tag: Option<String>,
    is_active: bool,
    category_id: i32,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            stock: row.stock,
            tag: row.tag,
            is_active: row.is_active,
            category_id: CategoryId::new(row.category_id),
            created_at: row.created_at,
        }
    }
}

/// Product columns plus the joined category, prefixed `category_`.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    #[sqlx(flatten)]
    product: ProductRow,
    category_name: String,
    category_emoji: String,
    category_description: Option<String>,
    category_is_active: bool,
}

impl From<ProductWithCategoryRow> for ProductWithCategory {
    fn from(row: ProductWithCategoryRow) -> Self {
        let category = Category {
            id: CategoryId::new(row.product.category_id),
            name: row.category_name,
            emoji: row.category_emoji,
            description: row.category_description,
            is_active: row.category_is_active,
        };
        Self {
            product: row.product.into(),
            category,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog database operations.
#[derive(Clone, Copy)]
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_category(&self, new: &NewCategory) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO categories (name, emoji, description, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, emoji, description, is_active
            ",
        )
        .bind(&new.name)
        .bind(&new.emoji)
        .bind(new.description.as_deref())
        .bind(new.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category"))?;

        Ok(row.into())
    }

    /// Get a category by its exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, emoji, description, is_active
            FROM categories
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including an
    /// unknown category or a negative stock count).
    pub async fn create_product(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products
                (name, description, price, image_url, stock, tag, is_active, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, price, image_url, stock, tag,
                      is_active, category_id, created_at
            ",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.image_url)
        .bind(new.stock)
        .bind(new.tag.as_deref())
        .bind(new.is_active)
        .bind(new.category_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get the first product with this exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, stock, tag,
                   is_active, category_id, created_at
            FROM products
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

impl CatalogStore for CatalogRepository<'_> {
    async fn active_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, emoji, description, is_active
            FROM categories
            WHERE is_active
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn active_products(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductWithCategoryRow>(
            r"
            SELECT p.id, p.name, p.description, p.price, p.image_url, p.stock, p.tag,
                   p.is_active, p.category_id, p.created_at,
                   c.name AS category_name,
                   c.emoji AS category_emoji,
                   c.description AS category_description,
                   c.is_active AS category_is_active
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.is_active
              AND ($1::INT4 IS NULL OR p.category_id = $1)
            ORDER BY p.id
            ",
        )
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn all_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, stock, tag,
                   is_active, category_id, created_at
            FROM products
            ORDER BY name DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, stock, tag,
                   is_active, category_id, created_at
            FROM products
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET stock = stock + $2
            WHERE id = $1 AND stock <= 2147483647 - $2
            RETURNING id, name, description, price, image_url, stock, tag,
                      is_active, category_id, created_at
            ",
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(Some(row.into()));
        }

        // No row: either the product is missing or the guard held it back
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        if exists {
            Err(RepositoryError::StockLimit(id))
        } else {
            Ok(None)
        }
    }
}
