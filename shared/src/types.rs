//! Common types used across the back office

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sort order for transaction list pages (purchases and sales invoices)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSort {
    #[default]
    DateDesc,
    DateAsc,
    TotalDesc,
    TotalAsc,
}

impl TransactionSort {
    /// Parse the sort parameter used by list endpoints; unknown values
    /// fall back to newest-first.
    pub fn from_param(param: &str) -> Self {
        match param {
            "date_asc" => TransactionSort::DateAsc,
            "total_desc" => TransactionSort::TotalDesc,
            "total_asc" => TransactionSort::TotalAsc,
            _ => TransactionSort::DateDesc,
        }
    }
}

/// Sort order for the product list page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    NameAsc,
    NameDesc,
    StockAsc,
    StockDesc,
}

impl ProductSort {
    pub fn from_param(param: &str) -> Self {
        match param {
            "name_desc" => ProductSort::NameDesc,
            "stock_asc" => ProductSort::StockAsc,
            "stock_desc" => ProductSort::StockDesc,
            _ => ProductSort::NameAsc,
        }
    }
}

// ============================================================================
// Money helpers
// ============================================================================

/// Line subtotal: `unit_price × quantity`, decimal-exact.
pub fn line_subtotal(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Apply a VAT percentage to a net total. A non-positive percentage
/// leaves the total unchanged.
pub fn apply_vat(total: Decimal, vat_percentage: Decimal) -> Decimal {
    if vat_percentage > Decimal::ZERO {
        total + total * vat_percentage / Decimal::from(100)
    } else {
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn subtotal_is_exact() {
        assert_eq!(line_subtotal(dec("19.99"), 3), dec("59.97"));
        assert_eq!(line_subtotal(dec("100"), 1), dec("100"));
    }

    #[test]
    fn vat_added_only_when_positive() {
        assert_eq!(apply_vat(dec("300"), dec("10")), dec("330"));
        assert_eq!(apply_vat(dec("300"), Decimal::ZERO), dec("300"));
        assert_eq!(apply_vat(dec("300"), dec("-5")), dec("300"));
    }

    #[test]
    fn sort_params_parse_with_fallback() {
        assert_eq!(TransactionSort::from_param("total_asc"), TransactionSort::TotalAsc);
        assert_eq!(TransactionSort::from_param("garbage"), TransactionSort::DateDesc);
        assert_eq!(ProductSort::from_param("stock_desc"), ProductSort::StockDesc);
        assert_eq!(ProductSort::from_param(""), ProductSort::NameAsc);
    }
}
