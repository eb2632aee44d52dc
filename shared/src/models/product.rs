//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Visibility status of a catalog product. Hiding is a soft delete;
/// hidden products stay referenced by historical transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Hidden,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Hidden => "hidden",
        }
    }
}

/// A catalog product.
///
/// `current_stock` and `last_purchase_price` are mutated only by
/// transaction completion and cancellation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    /// Unique code, format `PRD-` + 3-10 uppercase alphanumerics
    pub code: String,
    pub name: String,
    pub current_stock: i32,
    pub standard_selling_price: Decimal,
    pub last_purchase_price: Decimal,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
