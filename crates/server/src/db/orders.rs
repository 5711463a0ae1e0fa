//! Order repository: the transactional order workflow.
//!
//! Placing an order validates the request, prices and reserves stock for
//! every line, and persists the order header plus its items, all inside one
//! database transaction. Cancellation reverses the stock reservation and
//! removes the order the same way. Product rows are locked with
//! `SELECT ... FOR UPDATE`, so two concurrent orders for the same product
//! cannot both pass the stock check.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use orderdesk_core::{CustomerId, OrderId, OrderItemId, ProductId, Sku};

use super::RepositoryError;
use crate::models::order::{CreateOrder, Order, OrderItem, ProductSummary};

/// Errors that can occur while placing or cancelling an order.
///
/// Every variant except `Repository` is a pure rejection: the transaction is
/// rolled back and nothing was persisted.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request had no customer reference.
    #[error("Customer ID is required")]
    MissingCustomer,

    /// The request had no line items.
    #[error("Order must contain items")]
    NoItems,

    /// A line item requested zero or negative units.
    #[error("Item quantity must be positive")]
    InvalidQuantity(ProductId),

    /// The referenced customer does not exist.
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// A referenced product does not exist.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// A product has fewer units in stock than requested.
    #[error("Insufficient stock for product {name}")]
    InsufficientStock {
        /// The product that ran short.
        id: ProductId,
        /// Product name, used in the client-facing message.
        name: String,
        /// Units requested by the order line.
        requested: i32,
        /// Units actually available.
        available: i32,
    },

    /// Underlying repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Check the request shape before touching the database.
///
/// Mirrors the boundary contract: a missing customer wins over empty items,
/// which wins over any per-item problem.
fn validate(input: &CreateOrder) -> Result<CustomerId, OrderError> {
    let customer_id = input.customer_id.ok_or(OrderError::MissingCustomer)?;

    if input.items.is_empty() {
        return Err(OrderError::NoItems);
    }

    if let Some(line) = input.items.iter().find(|line| line.quantity <= 0) {
        return Err(OrderError::InvalidQuantity(line.product_id));
    }

    Ok(customer_id)
}

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    status: String,
    total: Decimal,
    created_at: DateTime<Utc>,
}

/// Internal row type for order items joined with their product.
///
/// The product columns are nullable because the join is a LEFT JOIN: the
/// product may have been deleted since the order was placed.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i32,
    order_id: i32,
    quantity: i32,
    price: Decimal,
    product_id: Option<i32>,
    product_name: Option<String>,
    product_price: Option<Decimal>,
    product_sku: Option<String>,
    product_image_url: Option<String>,
    product_category: Option<String>,
}

impl ItemRow {
    fn into_item(self) -> Result<OrderItem, RepositoryError> {
        let product = match (self.product_id, self.product_name, self.product_price) {
            (Some(id), Some(name), Some(price)) => {
                let sku = self.product_sku.as_deref().map(Sku::parse).transpose().map_err(
                    |e| RepositoryError::DataCorruption(format!("invalid sku in database: {e}")),
                )?;

                Some(ProductSummary {
                    id: ProductId::new(id),
                    name,
                    price,
                    sku,
                    image_url: self.product_image_url,
                    category: self.product_category,
                })
            }
            _ => None,
        };

        Ok(OrderItem {
            id: OrderItemId::new(self.id),
            product,
            quantity: self.quantity,
            price: self.price,
        })
    }
}

/// Internal row type for the locked product read inside `create`.
#[derive(Debug, sqlx::FromRow)]
struct LockedProductRow {
    id: i32,
    name: String,
    price: Decimal,
    stock_level: i32,
    sku: Option<String>,
    image_url: Option<String>,
    category: Option<String>,
}

fn assemble(header: OrderRow, items: Vec<OrderItem>) -> Order {
    Order {
        id: OrderId::new(header.id),
        customer_id: CustomerId::new(header.customer_id),
        status: header.status,
        total: header.total,
        created_at: header.created_at,
        items,
    }
}

const ORDER_COLUMNS: &str = "id, customer_id, status, total, created_at";

const ITEM_COLUMNS: &str = r"
    oi.id, oi.order_id, oi.quantity, oi.price,
    p.id AS product_id, p.name AS product_name, p.price AS product_price,
    p.sku AS product_sku, p.image_url AS product_image_url, p.category AS product_category";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all orders with their items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        self.with_items(headers).await
    }

    /// List all orders belonging to one customer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY id"
        ))
        .bind(customer_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.with_items(headers).await
    }

    /// Get one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let mut orders = self.with_items(vec![header]).await?;
        Ok(orders.pop())
    }

    /// Place an order: validate, price, reserve stock, persist.
    ///
    /// The whole operation runs in one transaction. Product rows are read
    /// with `FOR UPDATE`, each line's stock is checked and decremented in
    /// request order, then the order header and items are inserted with the
    /// product price snapshotted per line. Any failure rolls everything
    /// back; the store never sees a partially applied order.
    ///
    /// # Errors
    ///
    /// Returns the `OrderError` rejection variants for invalid input, an
    /// unknown customer or product, or insufficient stock; all without
    /// side effects.
    #[tracing::instrument(skip(self, input))]
    pub async fn create(&self, input: &CreateOrder) -> Result<Order, OrderError> {
        let customer_id = validate(input)?;

        let mut tx = self.pool.begin().await?;

        let mut total = Decimal::ZERO;
        let mut staged: Vec<(i32, LockedProductRow)> = Vec::with_capacity(input.items.len());

        for line in &input.items {
            let product = sqlx::query_as::<_, LockedProductRow>(
                r"
                SELECT id, name, price, stock_level, sku, image_url, category
                FROM product
                WHERE id = $1
                FOR UPDATE
                ",
            )
            .bind(line.product_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(OrderError::ProductNotFound(line.product_id))?;

            if product.stock_level < line.quantity {
                return Err(OrderError::InsufficientStock {
                    id: line.product_id,
                    name: product.name,
                    requested: line.quantity,
                    available: product.stock_level,
                });
            }

            total += product.price * Decimal::from(line.quantity);

            sqlx::query(
                "UPDATE product SET stock_level = stock_level - $2, updated_at = now() \
                 WHERE id = $1",
            )
            .bind(line.product_id.as_i32())
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            staged.push((line.quantity, product));
        }

        let header = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (customer_id, status, total)
            VALUES ($1, 'pending', $2)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(customer_id.as_i32())
        .bind(total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return OrderError::CustomerNotFound(customer_id);
            }
            OrderError::from(e)
        })?;

        let mut items = Vec::with_capacity(staged.len());
        for (quantity, product) in staged {
            let item_id: i32 = sqlx::query_scalar(
                "INSERT INTO order_item (order_id, product_id, quantity, price) \
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(header.id)
            .bind(product.id)
            .bind(quantity)
            .bind(product.price)
            .fetch_one(&mut *tx)
            .await?;

            let sku = product.sku.as_deref().map(Sku::parse).transpose().map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid sku in database: {e}"))
            })?;

            items.push(OrderItem {
                id: OrderItemId::new(item_id),
                product: Some(ProductSummary {
                    id: ProductId::new(product.id),
                    name: product.name,
                    price: product.price,
                    sku,
                    image_url: product.image_url,
                    category: product.category,
                }),
                quantity,
                price: product.price,
            });
        }

        tx.commit().await?;

        tracing::info!(order_id = header.id, total = %header.total, "order placed");

        Ok(assemble(header, items))
    }

    /// Update an order's status. The status is a free-form string; no
    /// transition rules are enforced. Passing `None` leaves the order
    /// unchanged.
    ///
    /// Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: Option<&str>,
    ) -> Result<Option<Order>, RepositoryError> {
        if let Some(status) = status {
            let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
                .bind(id.as_i32())
                .bind(status)
                .execute(self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Ok(None);
            }
        }

        self.get(id).await
    }

    /// Cancel an order: restore stock, then delete the order and its items.
    ///
    /// Restoration and deletion commit atomically. Quantities are returned
    /// to each line's product; lines whose product has since been removed
    /// from the catalog are skipped (their `product_id` is NULL).
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Ok(false);
        }

        // Aggregate per product: the same product may appear on several lines.
        sqlx::query(
            r"
            UPDATE product p
            SET stock_level = p.stock_level + r.quantity, updated_at = now()
            FROM (
                SELECT product_id, SUM(quantity)::int AS quantity
                FROM order_item
                WHERE order_id = $1 AND product_id IS NOT NULL
                GROUP BY product_id
            ) r
            WHERE p.id = r.product_id
            ",
        )
        .bind(id.as_i32())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id = id.as_i32(), "order cancelled, stock restored");

        Ok(true)
    }

    /// Attach items (with product summaries) to a batch of order headers.
    async fn with_items(&self, headers: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            r"
            SELECT {ITEM_COLUMNS}
            FROM order_item oi
            LEFT JOIN product p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            "
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            by_order.entry(order_id).or_default().push(row.into_item()?);
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let items = by_order.remove(&header.id).unwrap_or_default();
                assemble(header, items)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderLine;

    fn line(product_id: i32, quantity: i32) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    #[test]
    fn test_validate_requires_customer() {
        let input = CreateOrder {
            customer_id: None,
            items: vec![line(1, 1)],
        };
        assert!(matches!(validate(&input), Err(OrderError::MissingCustomer)));
    }

    #[test]
    fn test_validate_requires_items() {
        let input = CreateOrder {
            customer_id: Some(CustomerId::new(1)),
            items: vec![],
        };
        assert!(matches!(validate(&input), Err(OrderError::NoItems)));
    }

    #[test]
    fn test_validate_missing_customer_wins_over_empty_items() {
        let input = CreateOrder {
            customer_id: None,
            items: vec![],
        };
        assert!(matches!(validate(&input), Err(OrderError::MissingCustomer)));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        for quantity in [0, -3] {
            let input = CreateOrder {
                customer_id: Some(CustomerId::new(1)),
                items: vec![line(1, 1), line(2, quantity)],
            };
            assert!(matches!(
                validate(&input),
                Err(OrderError::InvalidQuantity(id)) if id == ProductId::new(2)
            ));
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_input() {
        let input = CreateOrder {
            customer_id: Some(CustomerId::new(7)),
            items: vec![line(1, 3), line(2, 1)],
        };
        assert_eq!(validate(&input).expect("valid"), CustomerId::new(7));
    }

    #[test]
    fn test_error_messages_match_api_contract() {
        assert_eq!(OrderError::MissingCustomer.to_string(), "Customer ID is required");
        assert_eq!(OrderError::NoItems.to_string(), "Order must contain items");
        assert_eq!(
            OrderError::ProductNotFound(ProductId::new(9)).to_string(),
            "Product 9 not found"
        );
        let err = OrderError::InsufficientStock {
            id: ProductId::new(1),
            name: "Widget".to_owned(),
            requested: 5,
            available: 2,
        };
        assert_eq!(err.to_string(), "Insufficient stock for product Widget");
    }
}
