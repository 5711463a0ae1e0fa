//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use orderdesk_core::{ProductId, Sku};

use super::RepositoryError;
use crate::models::product::{CreateProduct, Product, UpdateProduct};

/// Errors that can occur when adjusting a product's stock level.
#[derive(Debug, Error)]
pub enum StockError {
    /// The product does not exist.
    #[error("product not found")]
    NotFound,

    /// The adjustment would take the stock level below zero. No mutation
    /// occurs.
    #[error("insufficient stock: {available} available, adjustment {delta}")]
    Insufficient {
        /// Units currently in stock.
        available: i32,
        /// The rejected signed adjustment.
        delta: i32,
    },

    /// Underlying repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for StockError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock_level: i32,
    image_url: Option<String>,
    category: Option<String>,
    sku: Option<String>,
    brand: Option<String>,
    weight: Option<Decimal>,
    dimensions: Option<String>,
    features: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let sku = row
            .sku
            .as_deref()
            .map(Sku::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid sku in database: {e}"))
            })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            stock_level: row.stock_level,
            image_url: row.image_url,
            category: row.category,
            sku,
            brand: row.brand,
            weight: row.weight,
            dimensions: row.dimensions,
            features: row.features,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock_level, image_url, category, \
                               sku, brand, weight, dimensions, features, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        sku: Option<&Sku>,
        input: &CreateProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO product (name, description, price, stock_level, image_url,
                                 category, sku, brand, weight, dimensions, features)
            VALUES ($1, $2, $3, COALESCE($4, 0), $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.stock_level)
        .bind(input.image_url.as_deref())
        .bind(input.category.as_deref())
        .bind(sku.map(Sku::as_str))
        .bind(input.brand.as_deref())
        .bind(input.weight)
        .bind(input.dimensions.as_deref())
        .bind(input.features.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("SKU already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Update a product, merging provided fields over current values.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new SKU already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        sku: Option<&Sku>,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let sku = sku.map_or(current.sku, |s| Some(s.as_str().to_owned()));

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE product
            SET name = $2, description = $3, price = $4, stock_level = $5,
                image_url = $6, category = $7, sku = $8, brand = $9,
                weight = $10, dimensions = $11, features = $12, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(input.name.as_deref().unwrap_or(&current.name))
        .bind(input.description.as_deref().or(current.description.as_deref()))
        .bind(input.price.unwrap_or(current.price))
        .bind(input.stock_level.unwrap_or(current.stock_level))
        .bind(input.image_url.as_deref().or(current.image_url.as_deref()))
        .bind(input.category.as_deref().or(current.category.as_deref()))
        .bind(sku.as_deref())
        .bind(input.brand.as_deref().or(current.brand.as_deref()))
        .bind(input.weight.or(current.weight))
        .bind(input.dimensions.as_deref().or(current.dimensions.as_deref()))
        .bind(input.features.as_deref().or(current.features.as_deref()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("SKU already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        tx.commit().await?;

        Ok(Some(row.try_into()?))
    }

    /// Delete a product by ID.
    ///
    /// Existing order items keep their snapshot price; their product
    /// reference is cleared by the schema (`ON DELETE SET NULL`).
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adjust a product's stock level by a signed delta.
    ///
    /// Runs in a transaction with the product row locked so concurrent
    /// adjustments and order placements serialize per product.
    ///
    /// # Errors
    ///
    /// Returns `StockError::NotFound` if the product does not exist.
    /// Returns `StockError::Insufficient` if the result would be negative.
    pub async fn adjust_stock(&self, id: ProductId, delta: i32) -> Result<Product, StockError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Err(StockError::NotFound);
        };

        let new_level = i64::from(current.stock_level) + i64::from(delta);
        if new_level < 0 {
            return Err(StockError::Insufficient {
                available: current.stock_level,
                delta,
            });
        }
        let new_level = i32::try_from(new_level).map_err(|_| {
            RepositoryError::DataCorruption(format!("stock level out of range: {new_level}"))
        })?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE product
            SET stock_level = $2, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(new_level)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into().map_err(StockError::Repository)
    }
}
