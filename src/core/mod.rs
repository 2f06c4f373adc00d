//! Core business logic - framework-agnostic catalog, ledger, billing and reporting.
//!
//! Every operation takes a `DatabaseConnection` and returns plain values; the caller decides
//! how to render them and when to refresh.

/// Bill building session: merge-on-duplicate lines, editing and commit
pub mod bill;
/// Product catalog per stall
pub mod catalog;
/// Persisted sale rows keyed by stall, product and customer
pub mod ledger;
/// Per-stall sales aggregation
pub mod report;

use crate::errors::{Error, Result};

pub(crate) fn validate_stall_id(stall_id: i64) -> Result<()> {
    if stall_id <= 0 {
        return Err(Error::InvalidStall { stall_id });
    }
    Ok(())
}

pub(crate) fn validate_quantity(quantity: i64) -> Result<()> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

pub(crate) fn validate_not_blank(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation {
            message: format!("{what} cannot be empty"),
        });
    }
    Ok(())
}
