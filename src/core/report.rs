//! Sales report generation.
//!
//! Joins ledger rows with the catalog and totals them per product for one stall.
//! Rows are grouped by product **name**, not id: two products with the same name at the
//! same stall are reported as one row.

use crate::{
    entities::{Transaction, product, transaction},
    errors::Result,
};
use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, prelude::*, sea_query::Expr,
};

/// Totals for one product name at a stall.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct SalesReportRow {
    /// Product name the row groups by
    pub product_name: String,
    /// Units sold across all matching sales
    pub total_quantity: i64,
    /// Sum of `quantity * price`
    pub total_revenue: f64,
}

/// Builds the sales report for a stall, ordered by product name.
///
/// A stall with no sales yields an empty report.
pub async fn get_sales_report(
    db: &DatabaseConnection,
    stall_id: i64,
) -> Result<Vec<SalesReportRow>> {
    let revenue = Expr::expr(
        Expr::col((Transaction, transaction::Column::Quantity))
            .mul(Expr::col((product::Entity, product::Column::Price))),
    )
    .sum();

    let rows = Transaction::find()
        .select_only()
        .column_as(product::Column::Name, "product_name")
        .column_as(transaction::Column::Quantity.sum(), "total_quantity")
        .column_as(revenue, "total_revenue")
        .join(JoinType::InnerJoin, transaction::Relation::Product.def())
        .filter(transaction::Column::StallId.eq(stall_id))
        .group_by(product::Column::Name)
        .order_by_asc(product::Column::Name)
        .into_model::<SalesReportRow>()
        .all(db)
        .await?;

    tracing::debug!("Sales report for stall {stall_id}: {} row(s)", rows.len());
    Ok(rows)
}

/// Total revenue across report rows.
#[must_use]
pub fn grand_total(rows: &[SalesReportRow]) -> f64 {
    rows.iter().map(|row| row.total_revenue).sum()
}

/// Formats an amount as dollars with two decimals.
///
/// # Examples
/// ```
/// use stall_ledger::core::report::format_currency;
/// assert_eq!(format_currency(7.5), "$7.50");
/// ```
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

/// Renders a report as an aligned plain-text table with a total line.
#[must_use]
pub fn format_report(rows: &[SalesReportRow]) -> String {
    if rows.is_empty() {
        return "No sales recorded.".to_string();
    }

    let width = rows
        .iter()
        .map(|row| row.product_name.len())
        .max()
        .unwrap_or(0)
        .max("Product".len());

    let mut out = format!("{:<width$}  {:>8}  {:>12}\n", "Product", "Qty", "Total");
    for row in rows {
        out.push_str(&format!(
            "{:<width$}  {:>8}  {:>12}\n",
            row.product_name,
            row.total_quantity,
            format_currency(row.total_revenue)
        ));
    }
    out.push_str(&format!(
        "{:<width$}  {:>8}  {:>12}",
        "Total",
        "",
        format_currency(grand_total(rows))
    ));
    out
}
