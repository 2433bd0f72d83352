//! Seed the storefront database from a YAML file.
//!
//! Users are matched by username, categories and products by name. Existing
//! rows are left untouched, so the command can be re-run safely.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use cheez_core::CategoryId;
use cheez_storefront::db::{CatalogRepository, UserRepository};
use cheez_storefront::models::{NewCategory, NewProduct};
use cheez_storefront::services::{AuthError, AuthService};

use super::{CommandError, connect};

/// Top-level shape of the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub categories: Vec<NewCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// A product row; `category` is the category name.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub stock: i32,
    #[serde(default)]
    pub tag: Option<String>,
    pub category: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Counts reported at the end of a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Seed users, categories and products from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a product names an
/// unknown category, or a database operation fails.
pub async fn run(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed data from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(
        users = seed.users.len(),
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let pool = connect().await?;
    let summary = apply(&pool, &seed).await?;

    info!("Seeding complete!");
    info!("  Rows inserted: {}", summary.inserted);
    info!("  Rows skipped (already exist): {}", summary.skipped);
    Ok(())
}

async fn apply(pool: &PgPool, seed: &SeedFile) -> Result<SeedSummary, CommandError> {
    let mut summary = SeedSummary::default();

    let auth = AuthService::new(UserRepository::new(pool));
    for user in &seed.users {
        match auth.register(&user.username, &user.password, user.admin).await {
            Ok(_) => {
                info!(username = %user.username, "User created");
                summary.inserted += 1;
            }
            Err(AuthError::UserAlreadyExists) => summary.skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    let catalog = CatalogRepository::new(pool);
    let mut category_ids: HashMap<String, CategoryId> = HashMap::new();
    for category in &seed.categories {
        let existing = catalog.category_by_name(&category.name).await?;
        let id = if let Some(existing) = existing {
            summary.skipped += 1;
            existing.id
        } else {
            let created = catalog.create_category(category).await?;
            info!(name = %created.name, "Category created");
            summary.inserted += 1;
            created.id
        };
        category_ids.insert(category.name.clone(), id);
    }

    for product in &seed.products {
        if catalog.product_by_name(&product.name).await?.is_some() {
            summary.skipped += 1;
            continue;
        }

        let category_id = match category_ids.get(&product.category) {
            Some(id) => *id,
            None => catalog
                .category_by_name(&product.category)
                .await?
                .map(|c| c.id)
                .ok_or_else(|| CommandError::UnknownCategory {
                    product: product.name.clone(),
                    category: product.category.clone(),
                })?,
        };

        let created = catalog.create_product(&new_product(product, category_id)).await?;
        info!(name = %created.name, id = %created.id, "Product created");
        summary.inserted += 1;
    }

    Ok(summary)
}

/// Convert a seed row, treating a blank tag as no tag.
fn new_product(product: &SeedProduct, category_id: CategoryId) -> NewProduct {
    NewProduct {
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        image_url: product.image_url.clone(),
        stock: product.stock,
        tag: product
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned),
        is_active: product.is_active,
        category_id,
    }
}
