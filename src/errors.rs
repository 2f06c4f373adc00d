//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants fall into two
//! caller-facing kinds, validation failures and not-found references, which can be told
//! apart with [`Error::is_validation`] and [`Error::is_not_found`]. Everything else is an
//! infrastructure failure (database, configuration, environment).

use sea_orm::DbErr;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Price was zero, negative or not a finite number
    #[error("Invalid price: {price} (must be greater than zero)")]
    InvalidPrice {
        /// The rejected price
        price: f64,
    },

    /// Quantity below the allowed minimum
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i64,
    },

    /// Stall identifier was not a positive number
    #[error("Invalid stall id: {stall_id}")]
    InvalidStall {
        /// The rejected stall id
        stall_id: i64,
    },

    /// Any other rejected input (blank names, empty bill)
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the rejected input
        message: String,
    },

    /// The bill has already been committed or abandoned
    #[error("Bill is closed and can no longer be changed")]
    BillClosed,

    /// No product exists with this id
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The missing product id
        id: i64,
    },

    /// The active bill has no line for this product
    #[error("No bill line for product {product_id}")]
    LineNotFound {
        /// Product id that was looked up
        product_id: i64,
    },

    /// A bill line stands for several ledger rows, so a new quantity cannot be applied
    #[error("Product {product_id} has {rows} separate sale rows for this customer")]
    AmbiguousSale {
        /// Product of the affected line
        product_id: i64,
        /// Ledger rows sharing the (stall, product, customer) key
        rows: u64,
    },

    /// Commit failed after some lines were already recorded
    #[error("Bill partially committed: {recorded} of {total} lines recorded before failure: {source}")]
    PartialCommit {
        /// Number of lines persisted before the failure
        recorded: usize,
        /// Number of lines the commit attempted to persist
        total: usize,
        /// The failure that stopped the commit
        #[source]
        source: Box<Error>,
    },

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// True for input that was rejected before reaching storage.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPrice { .. }
                | Self::InvalidQuantity { .. }
                | Self::InvalidStall { .. }
                | Self::Validation { .. }
                | Self::BillClosed
                | Self::AmbiguousSale { .. }
        )
    }

    /// True for references to products or bill lines that do not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ProductNotFound { .. } | Self::LineNotFound { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
