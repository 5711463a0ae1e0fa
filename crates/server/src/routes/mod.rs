//! HTTP route handlers for the Orderdesk API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (database)
//!
//! # Customers
//! GET    /api/customers              - List customers
//! POST   /api/customers              - Create customer
//! GET    /api/customers/{id}         - Customer detail
//! PUT    /api/customers/{id}         - Update customer
//! DELETE /api/customers/{id}         - Delete customer
//!
//! # Products
//! GET    /api/products               - List products
//! POST   /api/products               - Create product
//! GET    /api/products/{id}          - Product detail
//! PUT    /api/products/{id}          - Update product
//! DELETE /api/products/{id}          - Delete product
//! PATCH  /api/products/{id}/stock    - Adjust stock by signed quantity
//!
//! # Orders
//! GET    /api/orders                 - List orders (with items)
//! POST   /api/orders                 - Place order (transactional)
//! GET    /api/orders/{id}            - Order detail
//! PUT    /api/orders/{id}            - Update order status
//! DELETE /api/orders/{id}            - Cancel order (restores stock)
//! GET    /api/orders/customer/{id}   - Orders for one customer
//! ```

pub mod customers;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list).post(customers::create))
        .route(
            "/{id}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/stock", patch(products::adjust_stock))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route(
            "/{id}",
            get(orders::get).put(orders::update).delete(orders::delete),
        )
        .route("/customer/{customer_id}", get(orders::list_for_customer))
}

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/customers", customer_routes())
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
}
