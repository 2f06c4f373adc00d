//! Ledger business logic - Handles the persisted sale rows.
//!
//! A row is appended for every committed bill line. Edits address rows by the
//! (`stall_id`, `product_id`, `customer_name`) composite rather than by row id, so two visits
//! by the same customer buying the same product at the same stall cannot be told apart:
//! an update or delete hits all of them. Customer names are trimmed before they are stored
//! or matched.

use crate::{
    core::{catalog, validate_not_blank, validate_quantity, validate_stall_id},
    entities::{Transaction, transaction},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};

/// Format of the `date_time` column.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time formatted for the `date_time` column.
#[must_use]
pub fn current_timestamp() -> String {
    chrono::Local::now().format(DATE_TIME_FORMAT).to_string()
}

/// Appends a sale row stamped with the current local time.
///
/// Rows are never merged here; collapsing repeated products is the bill's job before commit.
///
/// # Errors
/// Returns an error if:
/// - The stall id is not positive
/// - The quantity is below 1
/// - The customer name is empty or whitespace-only
/// - The product does not exist
/// - The database insert operation fails
pub async fn record_sale(
    db: &DatabaseConnection,
    stall_id: i64,
    product_id: i64,
    quantity: i64,
    customer_name: &str,
) -> Result<transaction::Model> {
    validate_stall_id(stall_id)?;
    validate_quantity(quantity)?;
    validate_not_blank(customer_name, "Customer name")?;
    let customer_name = customer_name.trim();
    catalog::require_product(db, product_id).await?;

    let sale = transaction::ActiveModel {
        stall_id: Set(stall_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        customer_name: Set(customer_name.to_string()),
        date_time: Set(current_timestamp()),
        ..Default::default()
    };
    let sale = sale.insert(db).await?;
    tracing::info!(
        "Recorded sale {}: {} x product {} for '{}' at stall {}",
        sale.id,
        quantity,
        product_id,
        customer_name,
        stall_id
    );
    Ok(sale)
}

/// Overwrites the quantity on every row matching the composite key.
///
/// Returns the number of rows changed. A key with no rows is silently ignored and yields 0.
///
/// # Errors
/// Returns an error if `new_quantity` is below 1 or the database update fails.
pub async fn update_quantity(
    db: &DatabaseConnection,
    stall_id: i64,
    product_id: i64,
    customer_name: &str,
    new_quantity: i64,
) -> Result<u64> {
    validate_quantity(new_quantity)?;
    let customer_name = customer_name.trim();

    let result = Transaction::update_many()
        .col_expr(transaction::Column::Quantity, Expr::value(new_quantity))
        .filter(transaction::Column::StallId.eq(stall_id))
        .filter(transaction::Column::ProductId.eq(product_id))
        .filter(transaction::Column::CustomerName.eq(customer_name))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!(
            "No sale rows for stall {stall_id}, product {product_id}, customer '{customer_name}'; quantity not updated"
        );
    } else {
        tracing::info!(
            "Set quantity {new_quantity} on {} row(s) for stall {stall_id}, product {product_id}, customer '{customer_name}'",
            result.rows_affected
        );
    }
    Ok(result.rows_affected)
}

/// Removes every row matching the composite key and returns how many were deleted.
/// Deleting an absent key is not an error.
pub async fn delete_sale(
    db: &DatabaseConnection,
    stall_id: i64,
    product_id: i64,
    customer_name: &str,
) -> Result<u64> {
    let customer_name = customer_name.trim();
    let result = Transaction::delete_many()
        .filter(transaction::Column::StallId.eq(stall_id))
        .filter(transaction::Column::ProductId.eq(product_id))
        .filter(transaction::Column::CustomerName.eq(customer_name))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::debug!(
            "No sale rows to delete for stall {stall_id}, product {product_id}, customer '{customer_name}'"
        );
    } else {
        tracing::info!(
            "Deleted {} sale row(s) for stall {stall_id}, product {product_id}, customer '{customer_name}'",
            result.rows_affected
        );
    }
    Ok(result.rows_affected)
}

/// All rows recorded for a customer at a stall, oldest first.
pub async fn get_sales_for_customer(
    db: &DatabaseConnection,
    stall_id: i64,
    customer_name: &str,
) -> Result<Vec<transaction::Model>> {
    let customer_name = customer_name.trim();
    Transaction::find()
        .filter(transaction::Column::StallId.eq(stall_id))
        .filter(transaction::Column::CustomerName.eq(customer_name))
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;
    use chrono::NaiveDateTime;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_record_sale_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = record_sale(&db, 1, 1, 0, "Amy").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));

        let result = record_sale(&db, 1, 1, -3, "Amy").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: -3 }
        ));

        let result = record_sale(&db, 1, 1, 1, "  ").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = record_sale(&db, -1, 1, 1, "Amy").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidStall { stall_id: -1 }
        ));

        assert!(db.into_transaction_log().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_record_sale_unknown_product() -> Result<()> {
        let db = setup_test_db().await?;

        let result = record_sale(&db, 1, 42, 1, "Amy").await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: 42 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_sale_integration() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        let sale = record_sale(&db, 1, product.id, 3, "Amy").await?;

        assert_eq!(sale.stall_id, 1);
        assert_eq!(sale.product_id, product.id);
        assert_eq!(sale.quantity, 3);
        assert_eq!(sale.customer_name, "Amy");
        assert!(NaiveDateTime::parse_from_str(&sale.date_time, DATE_TIME_FORMAT).is_ok());

        let stored = get_sales_for_customer(&db, 1, "Amy").await?;
        assert_eq!(stored, vec![sale]);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_sale_does_not_merge() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        record_sale(&db, 1, product.id, 1, "Amy").await?;
        record_sale(&db, 1, product.id, 2, "Amy").await?;

        let rows = get_sales_for_customer(&db, 1, "Amy").await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quantity, 1);
        assert_eq!(rows[1].quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_hits_all_matching_rows() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        record_sale(&db, 1, product.id, 1, "Amy").await?;
        record_sale(&db, 1, product.id, 2, "Amy").await?;
        record_sale(&db, 1, product.id, 4, "Ben").await?;

        let changed = update_quantity(&db, 1, product.id, "Amy", 5).await?;
        assert_eq!(changed, 2);

        let amy = get_sales_for_customer(&db, 1, "Amy").await?;
        assert!(amy.iter().all(|row| row.quantity == 5));
        let ben = get_sales_for_customer(&db, 1, "Ben").await?;
        assert_eq!(ben[0].quantity, 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_no_match_is_noop() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        let changed = update_quantity(&db, 1, product.id, "Nobody", 2).await?;
        assert_eq!(changed, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = update_quantity(&db, 1, 1, "Amy", 0).await;
        assert!(result.unwrap_err().is_validation());

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_name_is_trimmed() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        let sale = record_sale(&db, 1, product.id, 1, " Amy ").await?;
        assert_eq!(sale.customer_name, "Amy");

        assert_eq!(get_sales_for_customer(&db, 1, "Amy").await?.len(), 1);
        assert_eq!(update_quantity(&db, 1, product.id, "Amy  ", 3).await?, 1);
        assert_eq!(delete_sale(&db, 1, product.id, "  Amy").await?, 1);
        assert!(get_sales_for_customer(&db, 1, "Amy").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_sale_twice_is_noop() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        record_sale(&db, 1, product.id, 2, "Amy").await?;

        assert_eq!(delete_sale(&db, 1, product.id, "Amy").await?, 1);
        assert_eq!(delete_sale(&db, 1, product.id, "Amy").await?, 0);
        assert!(get_sales_for_customer(&db, 1, "Amy").await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_sale_scoped_to_stall() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        record_sale(&db, 1, product.id, 2, "Amy").await?;
        record_sale(&db, 2, product.id, 2, "Amy").await?;

        delete_sale(&db, 1, product.id, "Amy").await?;

        assert!(get_sales_for_customer(&db, 1, "Amy").await?.is_empty());
        assert_eq!(get_sales_for_customer(&db, 2, "Amy").await?.len(), 1);

        Ok(())
    }
}
