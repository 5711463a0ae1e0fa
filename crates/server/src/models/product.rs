//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderdesk_core::{ProductId, Sku};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Unit price. Non-negative.
    pub price: Decimal,
    /// Units currently available. Never negative.
    pub stock_level: i32,
    pub image_url: Option<String>,
    pub category: Option<String>,
    /// Merchant SKU, unique when present.
    pub sku: Option<Sku>,
    pub brand: Option<String>,
    pub weight: Option<Decimal>,
    pub dimensions: Option<String>,
    pub features: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a product.
///
/// The SKU arrives as a raw string and is parsed into a [`Sku`] at the route
/// boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock_level: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
}

/// Payload for updating a product. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock_level: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub features: Option<String>,
}

/// Payload for adjusting a product's stock level by a signed delta.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStock {
    /// Signed change to apply to `stock_level`. Required.
    #[serde(default)]
    pub quantity: Option<i32>,
}
