//! Admin order status updates.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use cheez_core::{OrderId, OrderStatus, TransitionPolicy};
use cheez_integration_tests::{MemoryStore, admin, checkout, customer, order_service};
use cheez_storefront::config::OrderSettings;
use cheez_storefront::services::ServiceError;

fn lifecycle() -> OrderSettings {
    OrderSettings {
        transitions: TransitionPolicy::Lifecycle,
        ..OrderSettings::default()
    }
}

#[tokio::test]
async fn test_unrestricted_allows_any_move() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, OrderSettings::default());
    let order = service.place_order(None, checkout(&[(1, 1, 45)])).await.unwrap();

    let updated = service
        .update_status(&admin(), order.id, "out_for_delivery")
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::OutForDelivery);

    let back = service.update_status(&admin(), order.id, "pending").await.unwrap();
    assert_eq!(back.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_invalid_status_leaves_order_unchanged() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, OrderSettings::default());
    let order = service.place_order(None, checkout(&[(1, 1, 45)])).await.unwrap();

    let err = service
        .update_status(&admin(), order.id, "shipped")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Invalid(ref m) if m == "Invalid status"));
    let detail = service.order(&admin(), order.id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_customer_cannot_update_status() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, OrderSettings::default());
    let order = service
        .place_order(Some(&customer()), checkout(&[(1, 1, 45)]))
        .await
        .unwrap();

    let err = service
        .update_status(&customer(), order.id, "delivered")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Forbidden));
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, OrderSettings::default());

    let err = service
        .update_status(&admin(), OrderId::new(404), "packing")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound("order")));
}

#[tokio::test]
async fn test_lifecycle_walks_forward() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, lifecycle());
    let order = service.place_order(None, checkout(&[(1, 1, 45)])).await.unwrap();

    for status in ["packing", "out_for_delivery", "delivered"] {
        let updated = service.update_status(&admin(), order.id, status).await.unwrap();
        assert_eq!(updated.status.as_str(), status);
    }
}

#[tokio::test]
async fn test_lifecycle_rejects_skips_and_reversals() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, lifecycle());
    let order = service.place_order(None, checkout(&[(1, 1, 45)])).await.unwrap();

    let err = service
        .update_status(&admin(), order.id, "delivered")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServiceError::Invalid(ref m) if m == "cannot move order from pending to delivered")
    );

    service.update_status(&admin(), order.id, "cancelled").await.unwrap();
    let err = service
        .update_status(&admin(), order.id, "pending")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Invalid(_)));
}

#[tokio::test]
async fn test_all_orders_is_admin_only_and_newest_first() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, OrderSettings::default());
    let first = service
        .place_order(Some(&customer()), checkout(&[(1, 1, 45)]))
        .await
        .unwrap();
    let second = service.place_order(None, checkout(&[(2, 1, 75)])).await.unwrap();

    let all = service.all_orders(&admin()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].order.id, second.id);
    assert_eq!(all[1].order.id, first.id);
    assert_eq!(all[1].items[0].product.name, "Masala Crunch Chips");

    assert!(matches!(
        service.all_orders(&customer()).await,
        Err(ServiceError::Forbidden)
    ));
}

#[tokio::test]
async fn test_order_detail_hidden_from_other_customers() {
    let store = MemoryStore::seeded();
    let service = order_service(&store, OrderSettings::default());
    let guest_order = service.place_order(None, checkout(&[(1, 1, 45)])).await.unwrap();

    assert!(matches!(
        service.order(&customer(), guest_order.id).await,
        Err(ServiceError::NotFound("order"))
    ));
    assert!(service.order(&admin(), guest_order.id).await.is_ok());
}
