//! Customer repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orderdesk_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    company: Option<String>,
    website: Option<String>,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            address: row.address,
            company: row.company,
            website: row.website,
            notes: row.notes,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CUSTOMER_COLUMNS: &str =
    "id, name, email, phone, address, company, website, notes, status, created_at, updated_at";

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all customers, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Create a new customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        input: &CreateCustomer,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r"
            INSERT INTO customer (name, email, phone, address, company, website, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'active'))
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(input.name.as_str())
        .bind(email.as_str())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.company.as_deref())
        .bind(input.website.as_deref())
        .bind(input.notes.as_deref())
        .bind(input.status.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("Email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Update a customer, merging provided fields over current values.
    ///
    /// Returns `None` if the customer does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CustomerId,
        email: Option<&Email>,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let email = email.map_or(current.email, |e| e.as_str().to_owned());

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r"
            UPDATE customer
            SET name = $2, email = $3, phone = $4, address = $5, company = $6,
                website = $7, notes = $8, status = $9, updated_at = now()
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(input.name.as_deref().unwrap_or(&current.name))
        .bind(email.as_str())
        .bind(input.phone.as_deref().or(current.phone.as_deref()))
        .bind(input.address.as_deref().or(current.address.as_deref()))
        .bind(input.company.as_deref().or(current.company.as_deref()))
        .bind(input.website.as_deref().or(current.website.as_deref()))
        .bind(input.notes.as_deref().or(current.notes.as_deref()))
        .bind(input.status.as_deref().unwrap_or(&current.status))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("Email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        tx.commit().await?;

        Ok(Some(row.try_into()?))
    }

    /// Delete a customer by ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the customer was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer still has orders.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customer WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict("Customer has existing orders".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
