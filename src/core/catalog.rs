//! Catalog business logic - Handles all product-related operations.
//!
//! Products belong to a single stall and cannot be changed or removed once created.
//! Prices must be strictly positive; two products may share a name.

use crate::{
    core::{validate_not_blank, validate_stall_id},
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates a new product for `stall_id`, performing input validation.
///
/// The name is trimmed before it is stored. The returned model carries the generated id.
///
/// # Errors
/// Returns an error if:
/// - The stall id is not positive
/// - The product name is empty or whitespace-only
/// - The price is zero, negative or not finite (NaN, infinity)
/// - The database insert operation fails
pub async fn add_product(
    db: &DatabaseConnection,
    stall_id: i64,
    name: String,
    price: f64,
) -> Result<product::Model> {
    validate_stall_id(stall_id)?;
    validate_not_blank(&name, "Product name")?;

    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidPrice { price });
    }

    let product = product::ActiveModel {
        stall_id: Set(stall_id),
        name: Set(name.trim().to_string()),
        price: Set(price),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    tracing::info!(
        "Added product {} '{}' at {:.2} to stall {}",
        product.id,
        product.name,
        product.price,
        stall_id
    );
    Ok(product)
}

/// Lists every product of a stall in store order (ascending id).
/// Returns an empty list for a stall with no products.
pub async fn list_products(db: &DatabaseConnection, stall_id: i64) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::StallId.eq(stall_id))
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID, or `None` if it does not exist.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_product_by_id`] but a missing product is an error.
pub(crate) async fn require_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<product::Model> {
    get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Unit price of a product.
///
/// # Errors
/// Returns `ProductNotFound` if no product has this id.
pub async fn get_price(db: &DatabaseConnection, product_id: i64) -> Result<f64> {
    Ok(require_product(db, product_id).await?.price)
}

/// Display name of a product.
///
/// # Errors
/// Returns `ProductNotFound` if no product has this id.
pub async fn get_name(db: &DatabaseConnection, product_id: i64) -> Result<String> {
    Ok(require_product(db, product_id).await?.name)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_add_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Test empty name validation
        let result = add_product(&db, 1, String::new(), 10.0).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Test whitespace-only name validation
        let result = add_product(&db, 1, "   ".to_string(), 10.0).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        // Zero and negative prices
        let result = add_product(&db, 1, "X".to_string(), 0.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPrice { price: 0.0 }
        ));
        let result = add_product(&db, 1, "X".to_string(), -1.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPrice { price: -1.0 }
        ));

        // Test NaN price validation
        let result = add_product(&db, 1, "X".to_string(), f64::NAN).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidPrice { price: _ }));

        // Test infinity price validation
        let result = add_product(&db, 1, "X".to_string(), f64::INFINITY).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidPrice { price: _ }));

        // Stall ids must be positive
        let result = add_product(&db, 0, "X".to_string(), 1.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidStall { stall_id: 0 }
        ));

        // Nothing reached the database
        assert!(db.into_transaction_log().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let product = add_product(&db, 1, "  Tea ".to_string(), 2.50).await?;

        assert_eq!(product.name, "Tea");
        assert_eq!(product.price, 2.50);
        assert_eq!(product.stall_id, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_includes_new_product_once() -> Result<()> {
        let db = setup_test_db().await?;

        let tea = create_custom_product(&db, 1, "Tea", 2.50).await?;
        let coffee = create_custom_product(&db, 1, "Coffee", 3.00).await?;
        create_custom_product(&db, 2, "Juice", 4.00).await?;

        let products = list_products(&db, 1).await?;
        assert_eq!(products, vec![tea.clone(), coffee]);
        assert_eq!(products.iter().filter(|p| p.id == tea.id).count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_empty_stall() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, 1, "Tea").await?;

        let products = list_products(&db, 2).await?;
        assert!(products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_custom_product(&db, 1, "Tea", 2.0).await?;
        let second = create_custom_product(&db, 1, "Tea", 3.0).await?;

        assert_ne!(first.id, second.id);
        assert_eq!(list_products(&db, 1).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_price_and_name() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        assert_eq!(get_price(&db, product.id).await?, product.price);
        assert_eq!(get_name(&db, product.id).await?, product.name);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_price_and_name_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = get_price(&db, 999).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: 999 }));

        let result = get_name(&db, 999).await;
        let error = result.unwrap_err();
        assert!(error.is_not_found());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_product_by_id_integration() -> Result<()> {
        let (db, product) = setup_with_product().await?;

        let found = get_product_by_id(&db, product.id).await?;
        assert_eq!(found, Some(product));

        let not_found = get_product_by_id(&db, 999).await?;
        assert!(not_found.is_none());

        Ok(())
    }
}
