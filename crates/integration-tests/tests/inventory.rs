//! Admin inventory adjustment.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use cheez_core::ProductId;
use cheez_integration_tests::{MemoryStore, admin, catalog_service, customer};
use cheez_storefront::services::ServiceError;

#[tokio::test]
async fn test_admin_adds_stock() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    let product = service.add_stock(&admin(), ProductId::new(1), 10).await.unwrap();

    assert_eq!(product.stock, 60);
    assert_eq!(store.stock(ProductId::new(1)).await, Some(60));
}

#[tokio::test]
async fn test_restocks_accumulate() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    service.add_stock(&admin(), ProductId::new(2), 5).await.unwrap();
    let product = service.add_stock(&admin(), ProductId::new(2), 7).await.unwrap();

    assert_eq!(product.stock, 52);
}

#[tokio::test]
async fn test_customer_cannot_adjust_stock() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    let err = service
        .add_stock(&customer(), ProductId::new(1), 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Forbidden));
    assert_eq!(store.stock(ProductId::new(1)).await, Some(50));
}

#[tokio::test]
async fn test_non_positive_quantity_is_invalid() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    for quantity in [0, -5] {
        let err = service
            .add_stock(&admin(), ProductId::new(1), quantity)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(ref m) if m == "Invalid quantity"));
    }
    assert_eq!(store.stock(ProductId::new(1)).await, Some(50));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    let err = service
        .add_stock(&admin(), ProductId::new(999), 10)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound("product")));
}

#[tokio::test]
async fn test_inventory_lists_everything_for_admin_only() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    let products = service.inventory(&admin()).await.unwrap();
    assert_eq!(products.len(), 4);
    // Name descending, inactive included
    assert_eq!(products[0].name, "Sugar Rush Candy");
    assert_eq!(products[3].name, "Chocolatey Biscuit Sticks");

    assert!(matches!(
        service.inventory(&customer()).await,
        Err(ServiceError::Forbidden)
    ));
}

#[tokio::test]
async fn test_restock_past_integer_range_is_invalid() {
    let store = MemoryStore::seeded();
    let service = catalog_service(&store);

    let err = service
        .add_stock(&admin(), ProductId::new(1), i32::MAX)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Invalid(ref m) if m.contains("cannot exceed")));
    assert_eq!(store.stock(ProductId::new(1)).await, Some(50));

    // Up to the limit is still fine
    let product = service
        .add_stock(&admin(), ProductId::new(1), i32::MAX - 50)
        .await
        .unwrap();
    assert_eq!(product.stock, i32::MAX);
}
