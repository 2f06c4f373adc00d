//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Creation uses `IF NOT EXISTS` and can run
//! on every startup.

use crate::entities::{Product, Transaction};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::env::VarError;

const DEFAULT_DATABASE_URL: &str = "sqlite://food_stalls.db?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to a
/// local `SQLite` file that is created on first use.
///
/// # Errors
/// Returns `EnvVar` if `DATABASE_URL` is set but not valid Unicode.
pub fn get_database_url() -> Result<String> {
    database_url_from(std::env::var("DATABASE_URL"))
}

fn database_url_from(value: std::result::Result<String, VarError>) -> Result<String> {
    match value {
        Ok(url) => Ok(url),
        Err(VarError::NotPresent) => Ok(DEFAULT_DATABASE_URL.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url()?;
    tracing::debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the `products` and `transactions` tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();
    let mut transaction_table = schema.create_table_from_entity(Transaction);
    transaction_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;

    Ok(())
}
