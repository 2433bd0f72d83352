//! Category and product listings.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use cheez_core::{CategoryId, ProductId};
use cheez_integration_tests::{MemoryStore, catalog_service};

#[tokio::test]
async fn test_only_active_categories_are_listed() {
    let store = MemoryStore::seeded();

    let categories = catalog_service(&store).categories().await.unwrap();

    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["After-School Snacks", "Healthy Munchies"]);
}

#[tokio::test]
async fn test_products_exclude_inactive_and_carry_category() {
    let store = MemoryStore::seeded();

    let products = catalog_service(&store).products(None).await.unwrap();

    let ids: Vec<ProductId> = products.iter().map(|p| p.product.id).collect();
    assert_eq!(ids, [ProductId::new(1), ProductId::new(2), ProductId::new(3)]);
    assert_eq!(products[2].category.name, "Healthy Munchies");
}

#[tokio::test]
async fn test_products_filter_by_category() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    let snacks = service.products(Some(CategoryId::new(1))).await.unwrap();
    assert_eq!(snacks.len(), 2);
    assert!(snacks.iter().all(|p| p.category.id == CategoryId::new(1)));

    let healthy = service.products(Some(CategoryId::new(2))).await.unwrap();
    assert_eq!(healthy.len(), 1);
    assert_eq!(healthy[0].product.name, "Fruit Munch Mix");
}

#[tokio::test]
async fn test_unknown_category_yields_empty_list() {
    let store = MemoryStore::seeded();

    let products = catalog_service(&store)
        .products(Some(CategoryId::new(0)))
        .await
        .unwrap();

    assert!(products.is_empty());
}

#[tokio::test]
async fn test_product_json_shape() {
    let store = MemoryStore::seeded();

    let products = catalog_service(&store)
        .products(Some(CategoryId::new(1)))
        .await
        .unwrap();
    let json = serde_json::to_value(&products[0]).unwrap();

    assert_eq!(json["id"], 1);
    assert_eq!(json["price"], "45");
    assert_eq!(json["categoryId"], 1);
    assert_eq!(json["category"]["emoji"], "🎒");
    assert!(json.get("imageUrl").is_some());
}
