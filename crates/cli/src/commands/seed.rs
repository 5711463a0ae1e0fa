//! Seed the database with demo customers and products.
//!
//! Inserts a small fixed catalog through the server crate's repositories so
//! the same validation and uniqueness handling applies as in the API.
//! Re-running is safe: rows that already exist are skipped.

use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::info;

use orderdesk_core::{Email, Sku};
use orderdesk_server::db::{self, CustomerRepository, ProductRepository, RepositoryError};
use orderdesk_server::models::{CreateCustomer, CreateProduct};

/// Seed demo data.
///
/// # Errors
///
/// Returns an error if environment variables are missing or database
/// operations fail.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ORDERDESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ORDERDESK_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;

    let customers = CustomerRepository::new(&pool);
    for (name, email, company) in [
        ("Ada Lovelace", "ada@example.com", Some("Analytical Engines Ltd")),
        ("Grace Hopper", "grace@example.com", None),
        ("Edsger Dijkstra", "edsger@example.com", None),
    ] {
        let parsed = Email::parse(email)?;
        let input = CreateCustomer {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: None,
            address: None,
            company: company.map(str::to_owned),
            website: None,
            notes: None,
            status: None,
        };

        match customers.create(&parsed, &input).await {
            Ok(customer) => info!(id = %customer.id, email, "created customer"),
            Err(RepositoryError::Conflict(_)) => info!(email, "customer exists, skipping"),
            Err(e) => return Err(e.into()),
        }
    }

    let products = ProductRepository::new(&pool);
    for (name, sku, price, stock_level, category) in [
        ("Widget", "WIDGET-001", Decimal::new(500, 2), 100, "widgets"),
        ("Gadget", "GADGET-001", Decimal::new(1999, 2), 40, "gadgets"),
        ("Gizmo", "GIZMO-001", Decimal::new(250, 2), 250, "gizmos"),
    ] {
        let parsed = Sku::parse(sku)?;
        let input = CreateProduct {
            name: name.to_owned(),
            description: None,
            price,
            stock_level: Some(stock_level),
            image_url: None,
            category: Some(category.to_owned()),
            sku: Some(sku.to_owned()),
            brand: None,
            weight: None,
            dimensions: None,
            features: None,
        };

        match products.create(Some(&parsed), &input).await {
            Ok(product) => info!(id = %product.id, sku, "created product"),
            Err(RepositoryError::Conflict(_)) => info!(sku, "product exists, skipping"),
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seed complete");
    Ok(())
}
