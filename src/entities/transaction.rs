//! Transaction entity - One persisted bill line.
//!
//! Rows are written when a bill is committed and later edited or removed by the
//! (`stall_id`, `product_id`, `customer_name`) composite, never by `id`.
//! `date_time` holds the local time formatted as `YYYY-MM-DD HH:MM:SS`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stall where the sale happened
    pub stall_id: i64,
    /// Product that was sold
    pub product_id: i64,
    /// Units sold, at least 1
    pub quantity: i64,
    /// Name the customer gave at the counter
    pub customer_name: String,
    /// Local timestamp of the sale
    pub date_time: String,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
