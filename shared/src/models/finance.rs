//! Financial summary models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rollup over completed purchases and sales for a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
    pub income_count: i64,
    pub expense_count: i64,
}
