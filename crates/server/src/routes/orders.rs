//! Order endpoints, including the transactional placement workflow.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use orderdesk_core::{CustomerId, OrderId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::order::{CreateOrder, Order, UpdateOrder};
use crate::state::AppState;

/// GET /api/orders: list all orders with their items.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}: one order with its items.
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;
    Ok(Json(order))
}

/// POST /api/orders: place an order.
///
/// Validates the request, checks and reserves stock, and persists the order
/// with its items in one transaction. Any rejection leaves stock untouched.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = OrderRepository::new(state.pool()).create(&req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /api/orders/{id}: update the order status (free-form string).
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateOrder>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), req.status.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id}: cancel an order, restoring stock.
#[tracing::instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    let deleted = OrderRepository::new(state.pool())
        .delete(OrderId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Order not found".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/orders/customer/{customer_id}: orders for one customer.
pub async fn list_for_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i32>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(CustomerId::new(customer_id))
        .await?;
    Ok(Json(orders))
}
