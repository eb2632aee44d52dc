//! Purchase (inbound stock) transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::TransactionStatus;

/// A purchase order header. Lines are stored separately and owned
/// exclusively by their order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    /// Unique, caller-supplied reference number
    pub reference_number: String,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// One line of a purchase order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseLine {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    /// Snapshot of the product's `last_purchase_price` taken at
    /// completion time; used to restore the price on rollback.
    pub price_before_completion: Option<Decimal>,
}
