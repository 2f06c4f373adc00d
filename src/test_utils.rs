//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test products with sensible defaults.

use crate::{core::catalog, entities, errors::Result};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * price: 10.0
pub async fn create_test_product(
    db: &DatabaseConnection,
    stall_id: i64,
    name: &str,
) -> Result<entities::product::Model> {
    catalog::add_product(db, stall_id, name.to_string(), 10.0).await
}

/// Creates a test product with custom price.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    stall_id: i64,
    name: &str,
    price: f64,
) -> Result<entities::product::Model> {
    catalog::add_product(db, stall_id, name.to_string(), price).await
}

/// Sets up a test environment with one product on stall 1.
/// Returns (db, product) for ledger and billing tests.
pub async fn setup_with_product() -> Result<(DatabaseConnection, entities::product::Model)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, 1, "Test Product").await?;
    Ok((db, product))
}
