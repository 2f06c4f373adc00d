//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the `products` and `transactions` tables and their relationship.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod product;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
