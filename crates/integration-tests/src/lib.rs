//! Integration tests for Orderdesk.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p orderdesk-cli -- migrate
//!
//! # Start the server
//! cargo run -p orderdesk-server
//!
//! # Run integration tests
//! cargo test -p orderdesk-integration-tests -- --ignored
//! ```
//!
//! The server under test is located via `ORDERDESK_BASE_URL`
//! (default: `http://localhost:5000`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("ORDERDESK_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_owned())
}

/// HTTP client for tests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// A unique email so tests don't collide across runs.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

/// A unique SKU so tests don't collide across runs.
#[must_use]
pub fn unique_sku(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// Test helper: create a customer via the API, returning its representation.
///
/// # Panics
///
/// Panics if the request fails or does not return 201.
pub async fn create_test_customer(client: &Client) -> Value {
    let resp = client
        .post(format!("{}/api/customers", base_url()))
        .json(&json!({
            "name": "Test Customer",
            "email": unique_email("customer"),
        }))
        .send()
        .await
        .expect("Failed to create test customer");

    assert_eq!(resp.status(), 201);
    resp.json().await.expect("Failed to read customer body")
}

/// Test helper: create a product via the API, returning its representation.
///
/// # Panics
///
/// Panics if the request fails or does not return 201.
pub async fn create_test_product(client: &Client, price: &str, stock_level: i64) -> Value {
    let resp = client
        .post(format!("{}/api/products", base_url()))
        .json(&json!({
            "name": "Test Product",
            "price": price,
            "stock_level": stock_level,
            "sku": unique_sku("TEST"),
        }))
        .send()
        .await
        .expect("Failed to create test product");

    assert_eq!(resp.status(), 201);
    resp.json().await.expect("Failed to read product body")
}

/// Test helper: fetch a product's current stock level.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn stock_level(client: &Client, product_id: i64) -> i64 {
    let resp = client
        .get(format!("{}/api/products/{product_id}", base_url()))
        .send()
        .await
        .expect("Failed to fetch product");

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to read product body");
    body["stock_level"].as_i64().expect("stock_level missing")
}
