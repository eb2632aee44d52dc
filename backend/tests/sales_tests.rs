//! Sales transaction tests
//!
//! Tests for the sales lifecycle including:
//! - Server-side pricing and VAT arithmetic
//! - All-or-nothing stock verification at completion
//! - Stock restoration on cancel (no price restore)

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::TransactionStatus;
use shared::types::{apply_vat, line_subtotal};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// VAT is applied on the line total when positive
    #[test]
    fn test_vat_applied() {
        let net = line_subtotal(dec("100.00"), 3);
        assert_eq!(net, dec("300.00"));
        assert_eq!(apply_vat(net, dec("10")), dec("330.00"));
    }

    /// Zero VAT leaves the total unchanged
    #[test]
    fn test_zero_vat() {
        assert_eq!(apply_vat(dec("250.00"), Decimal::ZERO), dec("250.00"));
    }

    /// Fractional VAT percentages stay decimal-exact
    #[test]
    fn test_fractional_vat() {
        assert_eq!(apply_vat(dec("200.00"), dec("7.5")), dec("215.000"));
    }

    /// Completion decrements stock per line
    #[test]
    fn test_completion_decrements_stock() {
        let mut stock = 10;
        stock -= 3;
        assert_eq!(stock, 7);
    }

    /// Cancellation of a completed invoice restores stock exactly
    #[test]
    fn test_cancel_restores_stock() {
        let initial = 10;
        let mut stock = initial;

        stock -= 3; // complete
        stock += 3; // cancel

        assert_eq!(stock, initial);
    }

    /// Stock verification is all-or-nothing: one short line fails the
    /// whole completion and nothing is decremented
    #[test]
    fn test_all_or_nothing_stock_check() {
        let lines = [(10, 4), (2, 5), (8, 1)]; // (current_stock, quantity)

        let shortage = lines.iter().find(|(stock, qty)| stock < qty);
        assert!(shortage.is_some());

        // No decrement happens when any line is short
        let stocks: Vec<i32> = lines.iter().map(|(s, _)| *s).collect();
        assert_eq!(stocks, vec![10, 2, 8]);
    }

    /// When every line has stock, all lines are decremented
    #[test]
    fn test_sufficient_stock_completes() {
        let mut lines = [(10, 4), (6, 5), (8, 1)];

        assert!(lines.iter().all(|(stock, qty)| stock >= qty));
        for (stock, qty) in &mut lines {
            *stock -= *qty;
        }

        assert_eq!(lines.map(|(s, _)| s), [6, 1, 7]);
    }

    /// Two lines for the same product count as one demand against its
    /// stock: quantities are summed before the check
    #[test]
    fn test_duplicate_product_lines_aggregate() {
        let stock = 5;
        let lines = [(1u32, 3), (1u32, 3)]; // (product_id, quantity)

        // Per-line each quantity fits, which is not good enough
        assert!(lines.iter().all(|(_, qty)| stock >= *qty));

        let mut demands: Vec<(u32, i32)> = Vec::new();
        for (product, qty) in lines {
            match demands.last_mut() {
                Some((p, total)) if *p == product => *total += qty,
                _ => demands.push((product, qty)),
            }
        }

        assert_eq!(demands, vec![(1, 6)]);
        assert!(demands.iter().any(|(_, total)| stock < *total));
    }

    /// The insufficient-stock error names the offending product
    #[test]
    fn test_shortage_names_product() {
        let lines = [("Arabica beans", 10, 4), ("Paper cups", 2, 5)];

        let shortage = lines
            .iter()
            .find(|(_, stock, qty)| stock < qty)
            .map(|(name, _, _)| format!("Not enough stock for product: {}", name));

        assert_eq!(
            shortage.as_deref(),
            Some("Not enough stock for product: Paper cups")
        );
    }

    /// An invoice needs at least one line
    #[test]
    fn test_empty_invoice_rejected() {
        let lines: Vec<(u32, i32)> = vec![];
        assert!(lines.is_empty());
    }

    /// A completed invoice can still be cancelled; a cancelled one is done
    #[test]
    fn test_invoice_status_transitions() {
        assert!(TransactionStatus::Created.can_transition_to(TransactionStatus::Completed));
        assert!(TransactionStatus::Completed.can_transition_to(TransactionStatus::Cancelled));
        assert!(!TransactionStatus::Cancelled.can_transition_to(TransactionStatus::Created));
    }

    /// The catalog price is authoritative: a line's price comes from the
    /// product, and the computed total reflects it
    #[test]
    fn test_server_side_pricing() {
        let catalog_price = dec("45.00");
        let quantity = 2;

        // Whatever the caller sent is not part of the calculation
        let subtotal = line_subtotal(catalog_price, quantity);
        assert_eq!(subtotal, dec("90.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn vat_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=2500i64).prop_map(|n| Decimal::new(n, 2)) // 0.00 to 25.00
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// VAT never decreases the total, and zero VAT is the identity
        #[test]
        fn prop_vat_monotone(total in price_strategy(), vat in vat_strategy()) {
            let with_vat = apply_vat(total, vat);
            prop_assert!(with_vat >= total);
            prop_assert_eq!(apply_vat(total, Decimal::ZERO), total);
        }

        /// VAT formula: total × (1 + vat/100), decimal-exact
        #[test]
        fn prop_vat_formula(total in price_strategy(), vat in vat_strategy()) {
            let expected = total + total * vat / Decimal::from(100);
            prop_assert_eq!(apply_vat(total, vat), expected);
        }

        /// Complete-then-cancel leaves stock where it started, for any
        /// set of lines that passes the stock check
        #[test]
        fn prop_stock_roundtrip(
            lines in prop::collection::vec((1i32..=100, 1i32..=100), 1..10)
        ) {
            let initial: Vec<i32> = lines.iter().map(|(stock, qty)| stock + qty).collect();
            let mut stocks = initial.clone();

            // Complete: all lines have sufficient stock by construction
            for (i, (_, qty)) in lines.iter().enumerate() {
                prop_assert!(stocks[i] >= *qty);
                stocks[i] -= qty;
            }

            // Cancel
            for (i, (_, qty)) in lines.iter().enumerate() {
                stocks[i] += qty;
            }

            prop_assert_eq!(stocks, initial);
        }
    }
}
