//! Order route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use cheez_core::OrderId;

use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::{OptionalUser, RequireAdmin, RequireUser};
use crate::models::{Order, OrderWithItems};
use crate::services::PlaceOrderRequest;
use crate::state::AppState;

/// Status update body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Missing and unknown values are both reported as an invalid status.
    #[serde(default)]
    pub status: String,
}

/// `POST /api/orders`
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    ApiJson(body): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.orders().place_order(user.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders`
pub async fn mine(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderWithItems>>> {
    Ok(Json(state.orders().orders_for(&user).await?))
}

/// `GET /api/orders/admin`
pub async fn all(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> Result<Json<Vec<OrderWithItems>>> {
    Ok(Json(state.orders().all_orders(&user).await?))
}

/// `GET /api/orders/{id}`
pub async fn detail(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderWithItems>> {
    Ok(Json(state.orders().order(&user, id).await?))
}

/// `PATCH /api/orders/{id}`
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let order = state
        .orders()
        .update_status(&user, id, &body.status)
        .await?;
    Ok(Json(order))
}
