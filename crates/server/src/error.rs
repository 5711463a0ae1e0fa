//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Error responses are JSON: `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::{OrderError, RepositoryError, StockError};

/// Application-level error type for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Order placement or cancellation was rejected or failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Stock adjustment was rejected or failed.
    #[error("Stock error: {0}")]
    Stock(#[from] StockError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status and client-facing message for a repository error.
///
/// Internal details never reach the client.
fn repository_response(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_owned(),
        ),
    }
}

impl AppError {
    /// Status code and client-facing message for this error.
    fn response_parts(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_response(err),
            Self::Order(err) => match err {
                OrderError::MissingCustomer
                | OrderError::NoItems
                | OrderError::InvalidQuantity(_)
                | OrderError::InsufficientStock { .. } => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                OrderError::CustomerNotFound(_) | OrderError::ProductNotFound(_) => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                OrderError::Repository(inner) => repository_response(inner),
            },
            Self::Stock(err) => match err {
                StockError::NotFound => (StatusCode::NOT_FOUND, "Product not found".to_owned()),
                StockError::Insufficient { .. } => {
                    (StatusCode::BAD_REQUEST, "Insufficient stock".to_owned())
                }
                StockError::Repository(inner) => repository_response(inner),
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.response_parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_core::{CustomerId, ProductId};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Order not found".to_owned());
        assert_eq!(err.to_string(), "Not found: Order not found");

        let err = AppError::BadRequest("Quantity is required".to_owned());
        assert_eq!(err.to_string(), "Bad request: Quantity is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_rejections_map_to_client_errors() {
        assert_eq!(
            get_status(AppError::Order(OrderError::MissingCustomer)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::NoItems)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::ProductNotFound(ProductId::new(1)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::CustomerNotFound(CustomerId::new(1)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InsufficientStock {
                id: ProductId::new(1),
                name: "Widget".to_owned(),
                requested: 5,
                available: 2,
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_conflict_maps_to_409() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict(
                "Email already exists".to_owned()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_stock_errors() {
        assert_eq!(get_status(AppError::Stock(StockError::NotFound)), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Stock(StockError::Insufficient {
                available: 2,
                delta: -5
            })),
            StatusCode::BAD_REQUEST
        );
    }
}
