//! Bill building business logic.
//!
//! A [`Bill`] is the in-memory session for one customer at the counter. Lines are merged by
//! product, totals are priced from the catalog, and `commit` writes one ledger row per line.
//!
//! Lifecycle: `Empty` → `Building` → `Committed` or `Abandoned`. The last two are terminal;
//! start a new bill (or [`Bill::reopen`] the customer's rows) to keep working.
//!
//! Once a line is in the ledger, either because the bill was reopened or because an earlier
//! commit recorded it before failing, quantity edits are written through to the ledger
//! immediately using the (stall, product, customer) key. That key can match several rows
//! when a customer bought the same product on separate visits; such lines can be removed
//! but not re-quantified, since the ledger would apply the new quantity to every row.

use crate::{
    core::{catalog, ledger, validate_not_blank, validate_quantity, validate_stall_id},
    entities::transaction,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

/// Where a bill is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BillState {
    /// No lines yet
    #[default]
    Empty,
    /// At least one line
    Building,
    /// Lines written to the ledger and cleared
    Committed,
    /// Lines discarded without touching the ledger
    Abandoned,
}

/// One product on the active bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillLine {
    /// Product being bought
    pub product_id: i64,
    /// Units, at least 1
    pub quantity: i64,
}

/// A bill line priced from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDetail {
    /// Product being bought
    pub product_id: i64,
    /// Product name at the time of pricing
    pub name: String,
    /// Units on the bill
    pub quantity: i64,
    /// Unit price
    pub price: f64,
    /// `price * quantity`
    pub line_total: f64,
}

/// Priced view of a bill.
#[derive(Debug, Clone, PartialEq)]
pub struct BillTotals {
    /// One entry per bill line, in bill order
    pub lines: Vec<LineDetail>,
    /// Sum of all line totals
    pub grand_total: f64,
}

/// What the ledger holds for one product of a reopened or partially committed bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Persisted {
    quantity: i64,
    rows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LedgerKey {
    stall_id: i64,
    customer_name: String,
}

/// An in-progress bill for a single customer interaction.
#[derive(Debug, Default)]
pub struct Bill {
    state: BillState,
    lines: Vec<BillLine>,
    ledger_key: Option<LedgerKey>,
    persisted: HashMap<i64, Persisted>,
}

impl Bill {
    /// Starts an empty bill for a new sale.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a customer's recorded sales at a stall as an editable bill.
    ///
    /// Rows for the same product are merged into one line by summing their quantities;
    /// [`Bill::sale_rows`] tells how many rows stand behind each line.
    /// Edits made through [`Bill::set_line_quantity`] go straight to the ledger.
    pub async fn reopen(db: &DatabaseConnection, stall_id: i64, customer_name: &str) -> Result<Self> {
        validate_stall_id(stall_id)?;
        validate_not_blank(customer_name, "Customer name")?;
        let customer_name = customer_name.trim();

        let rows = ledger::get_sales_for_customer(db, stall_id, customer_name).await?;
        let mut bill = Self::new();
        for row in rows {
            bill.merge_line(row.product_id, row.quantity)?;
            bill.persisted
                .entry(row.product_id)
                .or_insert(Persisted {
                    quantity: 0,
                    rows: 0,
                })
                .rows += 1;
        }
        for line in &bill.lines {
            if let Some(persisted) = bill.persisted.get_mut(&line.product_id) {
                persisted.quantity = line.quantity;
                if persisted.rows > 1 {
                    tracing::warn!(
                        "Customer '{customer_name}' has {} sale rows for product {} at stall {stall_id}",
                        persisted.rows,
                        line.product_id
                    );
                }
            }
        }
        bill.ledger_key = Some(LedgerKey {
            stall_id,
            customer_name: customer_name.to_string(),
        });

        tracing::debug!(
            "Reopened bill for '{customer_name}' at stall {stall_id} with {} line(s)",
            bill.lines.len()
        );
        Ok(bill)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BillState {
        self.state
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[BillLine] {
        &self.lines
    }

    /// Whether the bill has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of `product_id` on the bill, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: i64) -> Option<i64> {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
    }

    /// Number of ledger rows behind a line, or `None` if the line is not in the ledger.
    #[must_use]
    pub fn sale_rows(&self, product_id: i64) -> Option<u64> {
        self.persisted.get(&product_id).map(|persisted| persisted.rows)
    }

    fn ensure_unambiguous(&self, product_id: i64) -> Result<()> {
        match self.persisted.get(&product_id) {
            Some(persisted) if persisted.rows > 1 => Err(Error::AmbiguousSale {
                product_id,
                rows: persisted.rows,
            }),
            _ => Ok(()),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            BillState::Committed | BillState::Abandoned => Err(Error::BillClosed),
            BillState::Empty | BillState::Building => Ok(()),
        }
    }

    fn merge_line(&mut self, product_id: i64, quantity: i64) -> Result<()> {
        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(Error::InvalidQuantity { quantity })?;
            }
            None => self.lines.push(BillLine {
                product_id,
                quantity,
            }),
        }
        self.state = BillState::Building;
        Ok(())
    }

    /// Brings a line in step with the ledger after `update_quantity` touched `rows` rows.
    fn reconcile(&mut self, index: usize, product_id: i64, quantity: i64, rows: u64) {
        let held = match rows {
            0 => {
                // Rows vanished from the ledger; the line is recorded again on commit.
                self.persisted.remove(&product_id);
                quantity
            }
            1 => {
                self.persisted.insert(product_id, Persisted { quantity, rows });
                quantity
            }
            _ => {
                let held = i64::try_from(rows)
                    .ok()
                    .and_then(|rows| quantity.checked_mul(rows))
                    .unwrap_or(i64::MAX);
                tracing::warn!(
                    "Quantity {quantity} applied to {rows} sale rows for product {product_id}; ledger now holds {held}"
                );
                self.persisted.insert(product_id, Persisted { quantity: held, rows });
                held
            }
        };
        self.lines[index].quantity = held;
    }

    /// Adds `quantity` units of a product. A product already on the bill has its quantity
    /// increased instead of getting a second line.
    ///
    /// # Errors
    /// Returns an error if the bill is closed, `quantity` is below 1, or the merged
    /// quantity would overflow. The bill is unchanged on error.
    pub fn add_line(&mut self, product_id: i64, quantity: i64) -> Result<()> {
        self.ensure_open()?;
        validate_quantity(quantity)?;

        self.merge_line(product_id, quantity)?;
        tracing::debug!(
            "Bill line for product {product_id} now has quantity {}",
            self.quantity_of(product_id).unwrap_or(quantity)
        );
        Ok(())
    }

    /// Replaces the quantity of a line, or removes the line when `new_quantity` is 0.
    ///
    /// Lines already in the ledger are updated or deleted there before the bill changes.
    /// Returns the number of ledger rows written, 0 for a line that is only in memory.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The bill is closed
    /// - `new_quantity` is negative
    /// - The bill has no line for `product_id`
    /// - A non-zero quantity targets a line backed by several ledger rows (`AmbiguousSale`)
    /// - The ledger write fails
    pub async fn set_line_quantity(
        &mut self,
        db: &DatabaseConnection,
        product_id: i64,
        new_quantity: i64,
    ) -> Result<u64> {
        self.ensure_open()?;
        if new_quantity < 0 {
            return Err(Error::InvalidQuantity {
                quantity: new_quantity,
            });
        }

        let index = self
            .lines
            .iter()
            .position(|line| line.product_id == product_id)
            .ok_or(Error::LineNotFound { product_id })?;

        let ledger_key = self
            .ledger_key
            .as_ref()
            .filter(|_| self.persisted.contains_key(&product_id));

        let mut written = 0;
        if new_quantity == 0 {
            if let Some(key) = ledger_key {
                written =
                    ledger::delete_sale(db, key.stall_id, product_id, &key.customer_name).await?;
            }
            self.persisted.remove(&product_id);
            self.lines.remove(index);
            if self.lines.is_empty() {
                self.state = BillState::Empty;
            }
        } else if let Some(key) = ledger_key {
            self.ensure_unambiguous(product_id)?;
            written = ledger::update_quantity(
                db,
                key.stall_id,
                product_id,
                &key.customer_name,
                new_quantity,
            )
            .await?;
            self.reconcile(index, product_id, new_quantity, written);
        } else {
            self.lines[index].quantity = new_quantity;
        }

        tracing::debug!("Bill line for product {product_id} set to quantity {new_quantity}");
        Ok(written)
    }

    /// Prices every line from the catalog and sums the bill.
    ///
    /// # Errors
    /// Returns `ProductNotFound` if a line references a product that does not exist.
    #[allow(clippy::cast_precision_loss)]
    pub async fn compute_totals(&self, db: &DatabaseConnection) -> Result<BillTotals> {
        let mut lines = Vec::with_capacity(self.lines.len());
        let mut grand_total = 0.0;

        for line in &self.lines {
            let product = catalog::require_product(db, line.product_id).await?;
            let line_total = product.price * line.quantity as f64;
            grand_total += line_total;
            lines.push(LineDetail {
                product_id: line.product_id,
                name: product.name,
                quantity: line.quantity,
                price: product.price,
                line_total,
            });
        }

        Ok(BillTotals { lines, grand_total })
    }

    /// Writes the bill to the ledger and closes it.
    ///
    /// New lines are recorded as sales; lines that are already in the ledger but whose
    /// quantity grew through [`Bill::add_line`] are updated. Returns the rows that were
    /// inserted.
    ///
    /// The lines are written one at a time and not as a unit. If a write fails after at least
    /// one succeeded, the bill stays open, remembers what reached the ledger, and the error is
    /// [`Error::PartialCommit`]. Committing again only writes what is still missing.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The bill is closed or has no lines
    /// - The stall id or customer name is invalid
    /// - The bill was reopened for a different stall or customer
    /// - A grown line is backed by several ledger rows (`AmbiguousSale`), checked before
    ///   anything is written
    /// - A ledger write fails
    pub async fn commit(
        &mut self,
        db: &DatabaseConnection,
        stall_id: i64,
        customer_name: &str,
    ) -> Result<Vec<transaction::Model>> {
        self.ensure_open()?;
        validate_stall_id(stall_id)?;
        validate_not_blank(customer_name, "Customer name")?;
        if self.lines.is_empty() {
            return Err(Error::Validation {
                message: "Cannot commit a bill with no lines".to_string(),
            });
        }

        let customer_name = customer_name.trim();
        let key = LedgerKey {
            stall_id,
            customer_name: customer_name.to_string(),
        };
        if self.ledger_key.as_ref().is_some_and(|existing| *existing != key) {
            return Err(Error::Validation {
                message: "Bill belongs to a different stall or customer".to_string(),
            });
        }

        let pending: Vec<BillLine> = self
            .lines
            .iter()
            .filter(|line| {
                self.persisted
                    .get(&line.product_id)
                    .is_none_or(|persisted| persisted.quantity != line.quantity)
            })
            .cloned()
            .collect();
        for line in &pending {
            self.ensure_unambiguous(line.product_id)?;
        }
        let total = pending.len();
        let mut recorded = Vec::with_capacity(total);

        for (done, line) in pending.into_iter().enumerate() {
            let outcome = if self.persisted.contains_key(&line.product_id) {
                match ledger::update_quantity(
                    db,
                    stall_id,
                    line.product_id,
                    customer_name,
                    line.quantity,
                )
                .await
                {
                    Ok(0) => {
                        ledger::record_sale(db, stall_id, line.product_id, line.quantity, customer_name)
                            .await
                            .map(Some)
                    }
                    Ok(_) => Ok(None),
                    Err(error) => Err(error),
                }
            } else {
                ledger::record_sale(db, stall_id, line.product_id, line.quantity, customer_name)
                    .await
                    .map(Some)
            };

            match outcome {
                Ok(sale) => {
                    self.persisted.insert(
                        line.product_id,
                        Persisted {
                            quantity: line.quantity,
                            rows: 1,
                        },
                    );
                    if self.ledger_key.is_none() {
                        self.ledger_key = Some(key.clone());
                    }
                    recorded.extend(sale);
                }
                Err(error) if done == 0 => return Err(error),
                Err(error) => {
                    tracing::warn!(
                        "Bill for '{customer_name}' at stall {stall_id} partially committed: {done} of {total} lines written"
                    );
                    return Err(Error::PartialCommit {
                        recorded: done,
                        total,
                        source: Box::new(error),
                    });
                }
            }
        }

        self.lines.clear();
        self.persisted.clear();
        self.state = BillState::Committed;
        tracing::info!(
            "Committed bill for '{customer_name}' at stall {stall_id}: {} new sale row(s)",
            recorded.len()
        );
        Ok(recorded)
    }

    /// Discards the bill without writing anything further to the ledger.
    ///
    /// # Errors
    /// Returns `BillClosed` if the bill was already committed or abandoned.
    pub fn abandon(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.lines.clear();
        self.persisted.clear();
        self.state = BillState::Abandoned;
        Ok(())
    }
}
