//! Order domain types.
//!
//! An [`Order`] always travels as an aggregate: the order row plus its line
//! items, each item carrying the product price snapshotted at order time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderdesk_core::{CustomerId, OrderId, OrderItemId, ProductId, Sku};

/// An order together with its line items (domain aggregate).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer the order belongs to.
    pub customer_id: CustomerId,
    /// Free-form status string, `pending` at creation.
    pub status: String,
    /// Sum of `price * quantity` across items, fixed at creation.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Recompute the total from the line items.
    ///
    /// Equals [`Order::total`] for any order this service created; exposed so
    /// callers (and tests) can check the invariant without trusting the
    /// stored column.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// A single line item within an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    /// Unique line-item ID.
    pub id: OrderItemId,
    /// Product summary for display. `None` when the product has been deleted
    /// from the catalog since the order was placed.
    pub product: Option<ProductSummary>,
    /// Units ordered. Positive.
    pub quantity: i32,
    /// Unit price snapshotted at order time, independent of later product
    /// price changes.
    pub price: Decimal,
}

impl OrderItem {
    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Reduced product representation nested inside order items.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    /// Current catalog price, which may differ from the item's snapshot.
    pub price: Decimal,
    pub sku: Option<Sku>,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

/// Payload for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

/// One requested (product, quantity) pair within [`CreateOrder`].
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Payload for updating an order. Only the status can change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrder {
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(id: i32, price: Decimal, quantity: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            product: None,
            quantity,
            price,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(1, d("5.00"), 3).line_total(), d("15.00"));
        assert_eq!(item(2, d("0.99"), 1).line_total(), d("0.99"));
    }

    #[test]
    fn test_items_total_sums_lines() {
        let order = Order {
            id: OrderId::new(1),
            customer_id: CustomerId::new(1),
            status: "pending".to_owned(),
            total: d("16.98"),
            created_at: Utc::now(),
            items: vec![item(1, d("5.00"), 3), item(2, d("0.99"), 2)],
        };
        assert_eq!(order.items_total(), d("16.98"));
        assert_eq!(order.items_total(), order.total);
    }

    #[test]
    fn test_order_serializes_expected_shape() {
        let order = Order {
            id: OrderId::new(1),
            customer_id: CustomerId::new(2),
            status: "pending".to_owned(),
            total: d("15.00"),
            created_at: Utc::now(),
            items: vec![OrderItem {
                id: OrderItemId::new(3),
                product: Some(ProductSummary {
                    id: ProductId::new(4),
                    name: "Widget".to_owned(),
                    price: d("5.00"),
                    sku: None,
                    image_url: None,
                    category: None,
                }),
                quantity: 3,
                price: d("5.00"),
            }],
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["customer_id"], 2);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["total"], "15.00");
        assert_eq!(json["items"][0]["quantity"], 3);
        assert_eq!(json["items"][0]["price"], "5.00");
        assert_eq!(json["items"][0]["product"]["name"], "Widget");
    }

    #[test]
    fn test_create_order_accepts_missing_fields() {
        let req: CreateOrder = serde_json::from_str("{}").unwrap();
        assert!(req.customer_id.is_none());
        assert!(req.items.is_empty());
    }
}
