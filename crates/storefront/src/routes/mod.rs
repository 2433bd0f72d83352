//! HTTP routes for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                      - Liveness
//! GET   /health/ready                - Readiness (database)
//!
//! # Auth
//! POST  /api/auth/login              - Login (rate limited)
//! POST  /api/auth/logout             - Logout
//! GET   /api/auth/me                 - Current user
//!
//! # Catalog
//! GET   /api/categories              - Active categories
//! GET   /api/products?categoryId=    - Active products with their category
//! GET   /api/products/inventory      - All products (admin)
//! PATCH /api/products/{id}/inventory - Add stock (admin)
//!
//! # Orders
//! POST  /api/orders                  - Place an order
//! GET   /api/orders                  - Own orders (logged in)
//! GET   /api/orders/admin            - All orders (admin)
//! GET   /api/orders/{id}             - One order (owner or admin)
//! PATCH /api/orders/{id}             - Update status (admin)
//! ```

pub mod auth;
pub mod catalog;
pub mod extract;
pub mod health;
pub mod orders;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth_rate_limiter, create_session_layer, request_id::make_request_span, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

pub use extract::{ApiJson, ApiPath, ApiQuery};

/// Build the complete application with all middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .merge(health::routes())
        .nest("/api", api_routes())
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Routes under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/categories", get(catalog::categories))
        .route("/products", get(catalog::products))
        .route("/products/inventory", get(catalog::inventory))
        .route("/products/{id}/inventory", patch(catalog::adjust_inventory))
        .route("/orders", get(orders::mine).post(orders::create))
        .route("/orders/admin", get(orders::all))
        .route(
            "/orders/{id}",
            get(orders::detail).patch(orders::update_status),
        )
}

/// Routes under `/api/auth`.
pub fn auth_routes() -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(auth::login))
        .route_layer(auth_rate_limiter());

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(login)
}
