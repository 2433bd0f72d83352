//! End-to-end tests against a running storefront.
//!
//! These tests require:
//! - A migrated and seeded database (`cheez migrate && cheez seed`)
//! - The storefront running (cargo run -p cheez-storefront)
//!
//! Run with: cargo test -p cheez-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the storefront API (configurable via environment).
fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A client holding a session for the seeded account.
async fn logged_in(username: &str, password: &str) -> Client {
    let client = client();
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

async fn first_product(client: &Client) -> Value {
    let products: Vec<Value> = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    products[0].clone()
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_login_me_logout_cycle() {
    let client = logged_in("user", "password").await;

    let me: Value = client
        .get(format!("{}/api/auth/me", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], "user");
    assert_eq!(me["isAdmin"], false);

    let resp = client
        .post(format!("{}/api/auth/logout", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/api/auth/me", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_wrong_password_is_unauthorized() {
    let resp = client()
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "username": "admin", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_checkout_decrements_stock_and_lists_order() {
    let customer = logged_in("user", "password").await;
    let product = first_product(&customer).await;
    let stock_before = product["stock"].as_i64().unwrap();
    let price: f64 = product["price"].as_str().unwrap().parse().unwrap();

    let resp = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "name": "Integration Test",
            "phone": "0300-1234567",
            "address": "Test Street 1",
            "paymentMethod": "cash_on_delivery",
            "items": [{ "productId": product["id"], "quantity": 1, "price": price }],
            "subtotal": price,
            "deliveryFee": 50,
            "total": price + 50.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.unwrap();
    assert_eq!(order["status"], "pending");

    let after = first_product(&customer).await;
    assert_eq!(after["stock"].as_i64().unwrap(), stock_before - 1);

    let mine: Vec<Value> = customer
        .get(format!("{}/api/orders", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine.iter().any(|o| o["id"] == order["id"]));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_admin_restocks_and_updates_status() {
    let admin = logged_in("admin", "admin123").await;
    let product = first_product(&admin).await;

    let resp = admin
        .patch(format!("{}/api/products/{}/inventory", base_url(), product["id"]))
        .json(&json!({ "quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(
        updated["stock"].as_i64().unwrap(),
        product["stock"].as_i64().unwrap() + 10
    );

    let orders: Vec<Value> = admin
        .get(format!("{}/api/orders/admin", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    if let Some(order) = orders.first() {
        let resp = admin
            .patch(format!("{}/api/orders/{}", base_url(), order["id"]))
            .json(&json!({ "status": "bogus" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_customer_cannot_reach_admin_routes() {
    let customer = logged_in("user", "password").await;

    let resp = customer
        .get(format!("{}/api/orders/admin", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
