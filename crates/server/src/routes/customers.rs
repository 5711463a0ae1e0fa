//! Customer CRUD endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use orderdesk_core::{CustomerId, Email};

use crate::db::CustomerRepository;
use crate::error::{AppError, Result};
use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use crate::state::AppState;

/// GET /api/customers: list all customers.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Customer>>> {
    let customers = CustomerRepository::new(state.pool()).list().await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id}: one customer.
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Customer>> {
    let customer = CustomerRepository::new(state.pool())
        .get(CustomerId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_owned()))?;
    Ok(Json(customer))
}

/// POST /api/customers: create a customer.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCustomer>,
) -> Result<(StatusCode, Json<Customer>)> {
    let email = Email::parse(&req.email)
        .map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;

    let customer = CustomerRepository::new(state.pool())
        .create(&email, &req)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/{id}: partial update, absent fields unchanged.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateCustomer>,
) -> Result<Json<Customer>> {
    let email = req
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))?;

    let customer = CustomerRepository::new(state.pool())
        .update(CustomerId::new(id), email.as_ref(), &req)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_owned()))?;
    Ok(Json(customer))
}

/// DELETE /api/customers/{id}.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    let deleted = CustomerRepository::new(state.pool())
        .delete(CustomerId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Customer not found".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}
