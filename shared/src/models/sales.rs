//! Sales (outbound stock) transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::TransactionStatus;

/// A sales invoice header
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalesInvoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub customer_name: String,
    pub vat_percentage: Decimal,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// One line of a sales invoice.
///
/// `unit_price` is always assigned server-side from the product's
/// standard selling price at creation time; caller-supplied prices are
/// ignored. Sales lines carry no price snapshot, so cancellation
/// restores stock only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalesLine {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}
