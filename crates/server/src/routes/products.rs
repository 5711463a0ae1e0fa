//! Product CRUD and stock adjustment endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;

use orderdesk_core::{ProductId, Sku};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::product::{AdjustStock, CreateProduct, Product, UpdateProduct};
use crate::state::AppState;

fn parse_sku(sku: Option<&str>) -> Result<Option<Sku>> {
    sku.map(Sku::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Invalid SKU: {e}")))
}

fn check_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest("Price cannot be negative".to_owned()));
    }
    Ok(())
}

fn check_stock_level(stock_level: i32) -> Result<()> {
    if stock_level < 0 {
        return Err(AppError::BadRequest(
            "Stock level cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

/// GET /api/products: list all products.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// GET /api/products/{id}: one product.
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
    Ok(Json(product))
}

/// POST /api/products: create a product.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    check_price(req.price)?;
    if let Some(stock_level) = req.stock_level {
        check_stock_level(stock_level)?;
    }
    let sku = parse_sku(req.sku.as_deref())?;

    let product = ProductRepository::new(state.pool())
        .create(sku.as_ref(), &req)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}: partial update, absent fields unchanged.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    if let Some(price) = req.price {
        check_price(price)?;
    }
    if let Some(stock_level) = req.stock_level {
        check_stock_level(stock_level)?;
    }
    let sku = parse_sku(req.sku.as_deref())?;

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), sku.as_ref(), &req)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/products/{id}/stock: adjust stock by a signed quantity.
#[tracing::instrument(skip(state))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<AdjustStock>,
) -> Result<Json<Product>> {
    let Some(quantity) = req.quantity else {
        return Err(AppError::BadRequest("Quantity is required".to_owned()));
    };

    let product = ProductRepository::new(state.pool())
        .adjust_stock(ProductId::new(id), quantity)
        .await?;
    Ok(Json(product))
}
